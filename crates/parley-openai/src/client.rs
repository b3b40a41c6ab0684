// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible model servers.
//!
//! Provides [`OpenAiClient`] which handles request construction,
//! bearer authentication, and transient error retry.

use std::time::Duration;

use parley_core::ParleyError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse, ModelList, SpeechRequest};

/// HTTP client for one OpenAI-compatible server.
///
/// Manages authentication headers, connection pooling, and retry logic
/// for transient errors (429, 500, 502, 503).
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

impl OpenAiClient {
    /// Creates a client for the server at `base_url` (e.g. `http://host:8001/v1`).
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ParleyError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                ParleyError::Config(format!("invalid API key header value: {e}"))
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ParleyError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Overrides the delay between retries (tests use zero).
    #[cfg(test)]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sends a chat completion request.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ParleyError> {
        let response = self.post_json("/chat/completions", request).await?;
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_str(&body).map_err(|e| ParleyError::Provider {
            message: format!("failed to parse chat completion: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Sends a speech request and returns the encoded audio.
    pub async fn speech(&self, request: &SpeechRequest) -> Result<Vec<u8>, ParleyError> {
        let response = self.post_json("/audio/speech", request).await?;
        let audio = response.bytes().await.map_err(|e| self.transport_error(e))?;
        Ok(audio.to_vec())
    }

    /// Lists the model ids the server offers.
    pub async fn list_models(&self) -> Result<Vec<String>, ParleyError> {
        let response = self
            .client
            .get(self.url("/models"))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        let list: ModelList = response.json().await.map_err(|e| ParleyError::Provider {
            message: format!("failed to parse model list: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }

    /// POSTs `body` as JSON, retrying once on transient statuses.
    async fn post_json<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, ParleyError> {
        let url = self.url(path);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, url = %url, "retrying request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| self.transport_error(e))?;

            let status = response.status();
            debug!(status = %status, attempt, url = %url, "response received");

            if status.is_success() {
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(api_error(status, &body));
                continue;
            }

            // Non-transient error or exhausted retries.
            return Err(api_error(status, &body));
        }

        Err(last_error.unwrap_or_else(|| ParleyError::Provider {
            message: format!("request to {url} failed after retries"),
            source: None,
        }))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn transport_error(&self, e: reqwest::Error) -> ParleyError {
        if e.is_timeout() {
            ParleyError::Timeout {
                duration: self.timeout,
            }
        } else {
            ParleyError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }
}

/// Builds a provider error from a non-success response, preferring the
/// server's structured error message.
fn api_error(status: reqwest::StatusCode, body: &str) -> ParleyError {
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => match api_err.error.type_ {
            Some(kind) => format!("API error {status} ({kind}): {}", api_err.error.message),
            None => format!("API error {status}: {}", api_err.error.message),
        },
        Err(_) => format!("API returned {status}: {body}"),
    };
    ParleyError::Provider {
        message,
        source: None,
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}
