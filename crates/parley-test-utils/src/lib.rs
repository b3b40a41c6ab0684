// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Parley.
//!
//! Provides mock collaborators and in-memory upload fixtures for fast,
//! deterministic, CI-runnable tests without model servers.
//!
//! # Components
//!
//! - [`MockInference`] - Mock inference provider that records requests
//! - [`MockSynthesizer`] - Mock speech synthesizer with failure and gating modes
//! - [`fixtures`] - Generated PNG and PDF uploads

pub mod fixtures;
pub mod mock_inference;
pub mod mock_speech;

pub use mock_inference::MockInference;
pub use mock_speech::{MockSynthesizer, SynthesisGate};
