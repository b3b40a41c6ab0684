// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Speech synthesis trait for the text-to-speech model.

use std::path::Path;

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::collaborator::Collaborator;

/// Converts text to audio.
///
/// Invoked by background workers outside the request/response cycle.
#[async_trait]
pub trait SpeechSynthesizer: Collaborator {
    /// File extension of the audio this synthesizer produces (e.g. `wav`).
    fn audio_format(&self) -> &str;

    /// Synthesizes `text` and writes the audio to `output`.
    async fn synthesize(&self, text: &str, output: &Path) -> Result<(), ParleyError>;
}
