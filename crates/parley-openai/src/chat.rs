// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multimodal chat provider.

use std::time::Duration;

use async_trait::async_trait;
use parley_config::model::InferenceConfig;
use parley_core::traits::{Collaborator, InferenceProvider};
use parley_core::types::{GenerationRequest, HealthStatus};
use parley_core::ParleyError;
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{ChatMessage, ChatRequest, ContentPart};

/// [`InferenceProvider`] backed by `POST /chat/completions`.
///
/// Each question is sent as a fresh two-message conversation: the configured
/// system prompt, then a user message holding the prompt text and, for image
/// sessions, an `image_url` part.
pub struct ChatCompletionsProvider {
    client: OpenAiClient,
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl ChatCompletionsProvider {
    pub fn new(config: &InferenceConfig) -> Result<Self, ParleyError> {
        let client = OpenAiClient::new(
            &config.base_url,
            config.api_key.as_deref(),
            Duration::from_secs(config.timeout_secs),
        )?;
        info!(
            model = %config.model,
            base_url = %config.base_url,
            "chat completions provider initialized"
        );
        Ok(Self::with_client(
            client,
            config.model.clone(),
            config.max_tokens,
            config.system_prompt.clone(),
        ))
    }

    fn with_client(
        client: OpenAiClient,
        model: String,
        max_tokens: u32,
        system_prompt: String,
    ) -> Self {
        Self {
            client,
            model,
            max_tokens,
            system_prompt,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn to_chat_request(&self, request: &GenerationRequest) -> ChatRequest {
        let mut content = vec![ContentPart::text(request.prompt())];
        if let Some(url) = &request.image_url {
            debug!(image_url = %url, "attaching image to prompt");
            content.push(ContentPart::image(url.clone()));
        }

        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(self.system_prompt.clone()),
                ChatMessage::user(content),
            ],
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl Collaborator for ChatCompletionsProvider {
    fn name(&self) -> &str {
        "openai-chat"
    }

    /// Lists the server's models. A reachable server that does not offer the
    /// configured model is degraded rather than down: some servers alias names.
    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        match self.client.list_models().await {
            Ok(models) if models.iter().any(|m| m == &self.model) => Ok(HealthStatus::Healthy),
            Ok(models) => Ok(HealthStatus::Degraded(format!(
                "model `{}` not listed by server (offers: {})",
                self.model,
                models.join(", ")
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl InferenceProvider for ChatCompletionsProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<String, ParleyError> {
        let chat_request = self.to_chat_request(&request);
        let response = self.client.chat(&chat_request).await?;

        let answer = response.answer().ok_or_else(|| ParleyError::Provider {
            message: "chat completion contained no answer".into(),
            source: None,
        })?;
        info!(
            chars = answer.chars().count(),
            with_image = request.image_url.is_some(),
            "generation successful"
        );
        Ok(answer.to_string())
    }
}
