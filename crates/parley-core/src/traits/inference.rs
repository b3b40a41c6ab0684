// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inference provider trait for the multimodal chat model.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::collaborator::Collaborator;
use crate::types::GenerationRequest;

/// Answers a question, optionally grounded in session context.
///
/// Failures are returned to the caller, which substitutes a user-visible
/// message instead of propagating them to the HTTP client.
#[async_trait]
pub trait InferenceProvider: Collaborator {
    /// Generates an answer for the request.
    async fn generate(&self, request: GenerationRequest) -> Result<String, ParleyError>;
}
