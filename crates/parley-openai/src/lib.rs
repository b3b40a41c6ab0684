// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborators for OpenAI-compatible model servers.
//!
//! [`ChatCompletionsProvider`] answers questions through `/chat/completions`
//! (vLLM serves multimodal models such as Pixtral this way) and
//! [`SpeechProvider`] synthesizes audio through `/audio/speech`.

pub mod chat;
pub mod client;
pub mod speech;
pub mod types;

pub use chat::ChatCompletionsProvider;
pub use client::OpenAiClient;
pub use speech::SpeechProvider;
