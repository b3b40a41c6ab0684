// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock inference provider for deterministic testing.
//!
//! `MockInference` implements `InferenceProvider` with pre-configured answers
//! and records every request it receives, so tests can assert on what the
//! model would have seen.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use parley_core::traits::{Collaborator, InferenceProvider};
use parley_core::types::{GenerationRequest, HealthStatus};
use parley_core::ParleyError;

/// A mock inference provider that returns pre-configured answers.
///
/// Answers are popped from a FIFO queue. When the queue is empty,
/// a default "mock answer" text is returned.
pub struct MockInference {
    answers: Arc<Mutex<VecDeque<String>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    failing: AtomicBool,
}

impl MockInference {
    /// Create a new mock with an empty answer queue.
    pub fn new() -> Self {
        Self {
            answers: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            failing: AtomicBool::new(false),
        }
    }

    /// Create a mock pre-loaded with the given answers.
    pub fn with_answers(answers: Vec<String>) -> Self {
        Self {
            answers: Arc::new(Mutex::new(VecDeque::from(answers))),
            ..Self::new()
        }
    }

    /// Create a mock whose every call fails.
    pub fn failing() -> Self {
        let mock = Self::new();
        mock.set_failing(true);
        mock
    }

    /// Add an answer to the end of the queue.
    pub async fn add_answer(&self, text: impl Into<String>) {
        self.answers.lock().await.push_back(text.into());
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every request received so far, in order.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }

    /// The most recent request, if any.
    pub async fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().await.last().cloned()
    }
}

impl Default for MockInference {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Collaborator for MockInference {
    fn name(&self) -> &str {
        "mock-inference"
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl InferenceProvider for MockInference {
    async fn generate(&self, request: GenerationRequest) -> Result<String, ParleyError> {
        self.requests.lock().await.push(request);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ParleyError::Provider {
                message: "mock inference failure".into(),
                source: None,
            });
        }
        Ok(self
            .answers
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock answer".to_string()))
    }
}
