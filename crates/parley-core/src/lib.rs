// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parley service.
//!
//! This crate provides the collaborator trait definitions, error types, and
//! common types used throughout the Parley workspace. Inference and speech
//! backends implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ParleyError;
pub use types::{GenerationRequest, HealthStatus, SessionMode, TaskStatus};

pub use traits::{Collaborator, InferenceProvider, SpeechSynthesizer};

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parley_error_has_all_variants() {
        let _config = ParleyError::Config("test".into());
        let _storage = ParleyError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _provider = ParleyError::Provider {
            message: "test".into(),
            source: None,
        };
        let _synthesis = ParleyError::Synthesis {
            message: "test".into(),
            source: None,
        };
        let _timeout = ParleyError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = ParleyError::Internal("test".into());
    }

    #[test]
    fn io_errors_become_storage_errors() {
        let io: ParleyError = std::io::Error::other("disk full").into();
        assert!(matches!(io, ParleyError::Storage { .. }));
        assert!(io.to_string().contains("disk full"));
    }

    #[test]
    fn session_mode_renders_lowercase() {
        assert_eq!(SessionMode::Pdf.to_string(), "pdf");
        assert_eq!(SessionMode::Image.to_string(), "image");
        assert_eq!(SessionMode::from_str("image").unwrap(), SessionMode::Image);
        let json = serde_json::to_string(&SessionMode::Pdf).unwrap();
        assert_eq!(json, "\"pdf\"");
    }

    #[test]
    fn task_status_terminal_states() {
        assert!(!TaskStatus::Processing.is_terminal());
        assert!(TaskStatus::Done.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert_eq!(TaskStatus::Processing.to_string(), "processing");
        let parsed: TaskStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(parsed, TaskStatus::Failed);
    }

    #[test]
    fn health_status_usability() {
        assert!(HealthStatus::Healthy.is_usable());
        assert!(HealthStatus::Degraded("slow".into()).is_usable());
        assert!(!HealthStatus::Unhealthy("down".into()).is_usable());
    }

    #[test]
    fn prompt_appends_delimited_context() {
        let request = GenerationRequest {
            question: "What is this about?".into(),
            text_context: Some("Hello world".into()),
            image_url: None,
        };
        assert_eq!(
            request.prompt(),
            "What is this about?\n\n--- Context ---\nHello world\n--- End Context ---"
        );
    }

    #[test]
    fn prompt_without_context_is_the_question() {
        assert_eq!(GenerationRequest::new("Hi").prompt(), "Hi");
        let blank = GenerationRequest {
            question: "Hi".into(),
            text_context: Some("  \n".into()),
            image_url: None,
        };
        assert_eq!(blank.prompt(), "Hi");
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_collaborator<T: Collaborator>() {}
        fn _assert_inference<T: InferenceProvider>() {}
        fn _assert_speech<T: SpeechSynthesizer>() {}
    }
}
