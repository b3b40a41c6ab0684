// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait that every external collaborator implements.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::types::HealthStatus;

/// The base trait for external collaborators (inference, speech synthesis).
///
/// Provides identity and a health check. The health check is consulted once at
/// startup to resolve optional capabilities, never per request.
#[async_trait]
pub trait Collaborator: Send + Sync + 'static {
    /// Returns the human-readable name of this collaborator instance.
    fn name(&self) -> &str;

    /// Performs a health check and returns the collaborator's current status.
    async fn health_check(&self) -> Result<HealthStatus, ParleyError>;
}
