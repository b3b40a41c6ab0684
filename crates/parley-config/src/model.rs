// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Parley service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// System prompt sent ahead of every question.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Sarah, a helpful AI assistant at the T-Systems \
Innovationcenter in Munich. Answer concisely in one or two brief paragraphs. Keep your responses \
short, clear, and to the point.";

/// Top-level Parley configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Static file directories.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Chat model endpoint.
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Text-to-speech endpoint and worker pool.
    #[serde(default)]
    pub tts: TtsConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL used to build links to uploaded images and audio. The
    /// inference server fetches images through it, so it must be reachable
    /// from there. Defaults to `http://{host}:{port}`.
    #[serde(default)]
    pub public_base_url: Option<String>,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Largest accepted upload, in MiB.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl ServerConfig {
    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL for public links, without a trailing slash.
    pub fn public_base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.host, self.port),
        }
    }

    /// Upload limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_base_url: None,
            log_level: default_log_level(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_upload_mb() -> usize {
    32
}

/// Static file directories. Uploads and audio must live under `static_dir`,
/// which is served at `/static`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    #[serde(default = "default_audio_dir")]
    pub audio_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            static_dir: default_static_dir(),
            upload_dir: default_upload_dir(),
            audio_dir: default_audio_dir(),
        }
    }
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_upload_dir() -> String {
    "static/uploads".to_string()
}

fn default_audio_dir() -> String {
    "static/audio".to_string()
}

/// OpenAI-compatible chat completions endpoint (vLLM, llama.cpp server, ...).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InferenceConfig {
    /// Base URL up to and including the API version, e.g. `http://localhost:8001/v1`.
    #[serde(default = "default_inference_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_inference_model")]
    pub model: String,

    /// Bearer token. `None` sends no `Authorization` header.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Maximum tokens to generate per answer.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-request timeout.
    #[serde(default = "default_inference_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_inference_base_url(),
            model: default_inference_model(),
            api_key: None,
            max_tokens: default_max_tokens(),
            timeout_secs: default_inference_timeout_secs(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_inference_base_url() -> String {
    "http://127.0.0.1:8001/v1".to_string()
}

fn default_inference_model() -> String {
    "mistralai/Pixtral-12B-2409".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_inference_timeout_secs() -> u64 {
    120
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

/// OpenAI-compatible `/audio/speech` endpoint and the synthesis worker pool.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TtsConfig {
    /// Whether synthesis is offered at all. When enabled but the endpoint
    /// fails its startup health check, synthesis is disabled for the run.
    #[serde(default = "default_tts_enabled")]
    pub enabled: bool,

    #[serde(default = "default_tts_base_url")]
    pub base_url: String,

    #[serde(default = "default_tts_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Voice name, for engines that offer several.
    #[serde(default)]
    pub voice: Option<String>,

    /// Audio container requested from the engine; also the file extension.
    #[serde(default = "default_response_format")]
    pub response_format: String,

    /// Number of concurrent synthesis jobs.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Jobs that may wait for a worker before new requests are refused.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default = "default_tts_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            enabled: default_tts_enabled(),
            base_url: default_tts_base_url(),
            model: default_tts_model(),
            api_key: None,
            voice: None,
            response_format: default_response_format(),
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            timeout_secs: default_tts_timeout_secs(),
        }
    }
}

fn default_tts_enabled() -> bool {
    true
}

fn default_tts_base_url() -> String {
    "http://127.0.0.1:8002/v1".to_string()
}

fn default_tts_model() -> String {
    "tts_models/en/ljspeech/vits".to_string()
}

fn default_response_format() -> String {
    "wav".to_string()
}

fn default_workers() -> usize {
    2
}

fn default_queue_capacity() -> usize {
    64
}

fn default_tts_timeout_secs() -> u64 {
    300
}
