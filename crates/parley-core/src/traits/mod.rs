// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! All collaborators extend the [`Collaborator`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod collaborator;
pub mod inference;
pub mod speech;

pub use collaborator::Collaborator;
pub use inference::InferenceProvider;
pub use speech::SpeechSynthesizer;
