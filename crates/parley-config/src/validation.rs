// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the constraints serde cannot express: non-empty hosts and paths,
//! well-formed URLs, directory nesting and positive pool sizes.

use std::path::Path;

use crate::diagnostic::ConfigError;
use crate::model::ParleyConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ParleyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("server.host must not be empty"));
    } else {
        let is_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            errors.push(ConfigError::validation(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            )));
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::validation("server.port must not be 0"));
    }

    if let Some(url) = &config.server.public_base_url {
        check_http_url("server.public_base_url", url, &mut errors);
    }

    if !LOG_LEVELS.contains(&config.server.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "server.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.server.log_level
        )));
    }

    if config.server.max_upload_mb == 0 {
        errors.push(ConfigError::validation(
            "server.max_upload_mb must be at least 1",
        ));
    }

    let storage = &config.storage;
    for (key, value) in [
        ("storage.static_dir", &storage.static_dir),
        ("storage.upload_dir", &storage.upload_dir),
        ("storage.audio_dir", &storage.audio_dir),
    ] {
        if value.trim().is_empty() {
            errors.push(ConfigError::validation(format!("{key} must not be empty")));
        }
    }
    if !storage.static_dir.trim().is_empty() {
        let root = Path::new(&storage.static_dir);
        for (key, dir) in [
            ("storage.upload_dir", &storage.upload_dir),
            ("storage.audio_dir", &storage.audio_dir),
        ] {
            let dir = Path::new(dir);
            if !dir.starts_with(root) || dir == root {
                errors.push(ConfigError::validation(format!(
                    "{key} `{}` must be a subdirectory of storage.static_dir `{}`",
                    dir.display(),
                    root.display()
                )));
            }
        }
    }

    check_http_url("inference.base_url", &config.inference.base_url, &mut errors);
    if config.inference.model.trim().is_empty() {
        errors.push(ConfigError::validation("inference.model must not be empty"));
    }
    if config.inference.max_tokens == 0 {
        errors.push(ConfigError::validation(
            "inference.max_tokens must be at least 1",
        ));
    }
    if config.inference.timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "inference.timeout_secs must be at least 1",
        ));
    }

    // An unused TTS section is not worth refusing to start over.
    let tts = &config.tts;
    if tts.enabled {
        check_http_url("tts.base_url", &tts.base_url, &mut errors);
        if tts.model.trim().is_empty() {
            errors.push(ConfigError::validation("tts.model must not be empty"));
        }
        if tts.response_format.is_empty()
            || !tts.response_format.chars().all(|c| c.is_ascii_alphanumeric())
        {
            errors.push(ConfigError::validation(format!(
                "tts.response_format `{}` must be a plain file extension such as `wav`",
                tts.response_format
            )));
        }
        if tts.workers == 0 {
            errors.push(ConfigError::validation("tts.workers must be at least 1"));
        }
        if tts.queue_capacity == 0 {
            errors.push(ConfigError::validation(
                "tts.queue_capacity must be at least 1",
            ));
        }
        if tts.timeout_secs == 0 {
            errors.push(ConfigError::validation("tts.timeout_secs must be at least 1"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(key: &str, url: &str, errors: &mut Vec<ConfigError>) {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    match rest {
        Some(rest) if !rest.is_empty() && !rest.starts_with('/') => {}
        _ => errors.push(ConfigError::validation(format!(
            "{key} `{url}` must be an absolute http:// or https:// URL"
        ))),
    }
}
