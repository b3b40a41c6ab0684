// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the registries, collaborators and the gateway.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Kind of context a session carries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Text extracted from an uploaded PDF.
    Pdf,
    /// An uploaded image served from the static store.
    Image,
}

/// Status of an asynchronous synthesis task.
///
/// `Done` and `Failed` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Processing,
    Done,
    Failed,
}

impl TaskStatus {
    /// Returns true for states that accept no further transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Failed)
    }
}

/// Health status reported by collaborator health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Collaborator is fully operational.
    Healthy,
    /// Collaborator is operational but experiencing issues.
    Degraded(String),
    /// Collaborator is not operational.
    Unhealthy(String),
}

impl HealthStatus {
    /// Returns true unless the collaborator reported itself unusable.
    pub fn is_usable(&self) -> bool {
        !matches!(self, HealthStatus::Unhealthy(_))
    }
}

/// A question for the inference provider, with optional session context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    /// The user's question.
    pub question: String,
    /// Text extracted from a PDF session, if any.
    pub text_context: Option<String>,
    /// Public URL of an image session, if any.
    pub image_url: Option<String>,
}

impl GenerationRequest {
    /// Creates a request without session context.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    /// Builds the user prompt: the question followed by a delimited context block
    /// when non-empty text context is present.
    pub fn prompt(&self) -> String {
        match self.text_context.as_deref() {
            Some(context) if !context.trim().is_empty() => format!(
                "{}\n\n--- Context ---\n{}\n--- End Context ---",
                self.question, context
            ),
            _ => self.question.clone(),
        }
    }
}
