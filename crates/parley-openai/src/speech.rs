// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text-to-speech provider.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use parley_config::model::TtsConfig;
use parley_core::traits::{Collaborator, SpeechSynthesizer};
use parley_core::types::HealthStatus;
use parley_core::ParleyError;
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::SpeechRequest;

/// [`SpeechSynthesizer`] backed by `POST /audio/speech`.
pub struct SpeechProvider {
    client: OpenAiClient,
    model: String,
    voice: Option<String>,
    response_format: String,
}

impl SpeechProvider {
    pub fn new(config: &TtsConfig) -> Result<Self, ParleyError> {
        let client = OpenAiClient::new(
            &config.base_url,
            config.api_key.as_deref(),
            Duration::from_secs(config.timeout_secs),
        )?;
        info!(
            model = %config.model,
            base_url = %config.base_url,
            format = %config.response_format,
            "speech provider initialized"
        );
        Ok(Self {
            client,
            model: config.model.clone(),
            voice: config.voice.clone(),
            response_format: config.response_format.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Re-labels a transport failure as a synthesis failure.
fn as_synthesis_error(err: ParleyError) -> ParleyError {
    match err {
        ParleyError::Provider { message, source } => ParleyError::Synthesis { message, source },
        other => other,
    }
}

#[async_trait]
impl Collaborator for SpeechProvider {
    fn name(&self) -> &str {
        "openai-speech"
    }

    /// Speech servers rarely list voices under `/models`, so reachability is
    /// all that is checked.
    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        match self.client.list_models().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for SpeechProvider {
    fn audio_format(&self) -> &str {
        &self.response_format
    }

    async fn synthesize(&self, text: &str, output: &Path) -> Result<(), ParleyError> {
        let request = SpeechRequest {
            model: self.model.clone(),
            input: text.to_string(),
            voice: self.voice.clone(),
            response_format: self.response_format.clone(),
        };
        let audio = self
            .client
            .speech(&request)
            .await
            .map_err(as_synthesis_error)?;

        if audio.is_empty() {
            return Err(ParleyError::Synthesis {
                message: "speech endpoint returned no audio".into(),
                source: None,
            });
        }

        tokio::fs::write(output, &audio).await?;
        debug!(path = %output.display(), bytes = audio.len(), "audio written");
        Ok(())
    }
}
