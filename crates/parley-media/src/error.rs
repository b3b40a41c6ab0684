// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error type for document, image and file store operations.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    /// The uploaded bytes cannot be processed. The message is safe to show
    /// to the caller.
    #[error("{0}")]
    InvalidInput(String),

    /// Reading, writing or creating something under the static root failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A path that should live under the static root does not.
    #[error("{} is not under the static root", .0.display())]
    OutsideStaticRoot(PathBuf),

    /// A blocking worker was cancelled or panicked for a reason unrelated
    /// to the input.
    #[error("media worker failed: {0}")]
    Worker(String),
}

impl MediaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MediaError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true when the uploaded content, not the server, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, MediaError::InvalidInput(_))
    }
}
