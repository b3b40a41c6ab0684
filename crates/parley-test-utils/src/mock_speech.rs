// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock speech synthesizer.
//!
//! Writes a small placeholder file instead of real audio. A synthesizer can
//! be gated so that tests observe tasks while they are still processing.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Semaphore};

use parley_core::traits::{Collaborator, SpeechSynthesizer};
use parley_core::types::HealthStatus;
use parley_core::ParleyError;

/// A mock synthesizer that writes `mock audio: {text}` to the output path.
pub struct MockSynthesizer {
    health: HealthStatus,
    failure: Option<String>,
    gate: Option<Arc<Semaphore>>,
    calls: AtomicUsize,
    texts: Mutex<Vec<String>>,
}

impl MockSynthesizer {
    /// A healthy synthesizer that succeeds immediately.
    pub fn new() -> Self {
        Self {
            health: HealthStatus::Healthy,
            failure: None,
            gate: None,
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
        }
    }

    /// A synthesizer whose every job fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    /// A synthesizer whose health check reports it unusable.
    pub fn unhealthy(reason: impl Into<String>) -> Self {
        Self {
            health: HealthStatus::Unhealthy(reason.into()),
            ..Self::new()
        }
    }

    /// A synthesizer whose health check reports it degraded but usable.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            health: HealthStatus::Degraded(reason.into()),
            ..Self::new()
        }
    }

    /// A synthesizer that waits for [`SynthesisGate::release`] before each job.
    pub fn gated() -> (Self, SynthesisGate) {
        let semaphore = Arc::new(Semaphore::new(0));
        let mock = Self {
            gate: Some(Arc::clone(&semaphore)),
            ..Self::new()
        };
        (mock, SynthesisGate(semaphore))
    }

    /// Number of `synthesize` calls that have started.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Texts passed to `synthesize`, in call order.
    pub async fn texts(&self) -> Vec<String> {
        self.texts.lock().await.clone()
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lets gated synthesis jobs proceed.
#[derive(Clone)]
pub struct SynthesisGate(Arc<Semaphore>);

impl SynthesisGate {
    /// Allows `jobs` more synthesis calls to run.
    pub fn release(&self, jobs: usize) {
        self.0.add_permits(jobs);
    }
}

#[async_trait]
impl Collaborator for MockSynthesizer {
    fn name(&self) -> &str {
        "mock-synthesizer"
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(self.health.clone())
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    fn audio_format(&self) -> &str {
        "wav"
    }

    async fn synthesize(&self, text: &str, output: &Path) -> Result<(), ParleyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().await.push(text.to_string());

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| ParleyError::Internal(e.to_string()))?
                .forget();
        }

        if let Some(message) = &self.failure {
            return Err(ParleyError::Synthesis {
                message: message.clone(),
                source: None,
            });
        }

        tokio::fs::write(output, format!("mock audio: {text}")).await?;
        Ok(())
    }
}
