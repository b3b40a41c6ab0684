// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session registry: per-conversation context and the files it owns.
//!
//! A session is created by the upload flow once a document or image has been
//! validated, read by the question flow, and destroyed either by an explicit
//! forget request or by the shutdown hook. Image sessions own their uploaded
//! file; destroying the session deletes it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parley_core::SessionMode;
use tracing::{debug, error, info, warn};

use crate::id::RecordId;
use crate::keyed::KeyedRegistry;

/// Context carried by a session. The variant determines the mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionContext {
    /// Text extracted from an uploaded PDF.
    Pdf { text_context: String },
    /// An uploaded image: its public URL and the file backing it.
    Image { image_url: String, file_path: PathBuf },
}

impl SessionContext {
    /// The mode implied by this context.
    pub fn mode(&self) -> SessionMode {
        match self {
            SessionContext::Pdf { .. } => SessionMode::Pdf,
            SessionContext::Image { .. } => SessionMode::Image,
        }
    }

    /// Extracted document text, for PDF sessions.
    pub fn text_context(&self) -> Option<&str> {
        match self {
            SessionContext::Pdf { text_context } => Some(text_context),
            SessionContext::Image { .. } => None,
        }
    }

    /// Public image URL, for image sessions.
    pub fn image_url(&self) -> Option<&str> {
        match self {
            SessionContext::Image { image_url, .. } => Some(image_url),
            SessionContext::Pdf { .. } => None,
        }
    }

    /// File exclusively owned by this session, if any.
    pub fn owned_file(&self) -> Option<&Path> {
        match self {
            SessionContext::Image { file_path, .. } => Some(file_path),
            SessionContext::Pdf { .. } => None,
        }
    }
}

/// A live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub context: SessionContext,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Shorthand for `self.context.mode()`.
    pub fn mode(&self) -> SessionMode {
        self.context.mode()
    }
}

/// Outcome of a bulk clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearReport {
    /// Sessions removed from the registry.
    pub sessions: usize,
    /// Owned files deleted from storage.
    pub files_removed: usize,
}

/// Registry of live sessions.
#[derive(Default)]
pub struct SessionRegistry {
    records: KeyedRegistry<SessionRecord>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new session and returns its id.
    pub fn create_session(&self, context: SessionContext) -> RecordId {
        let mode = context.mode();
        if let Some(path) = context.owned_file() {
            debug_assert!(
                !path.as_os_str().is_empty(),
                "image sessions must own a file path"
            );
        }
        let id = self.records.create(SessionRecord {
            context,
            created_at: Utc::now(),
        });
        info!(session_id = %id, mode = %mode, "session created");
        id
    }

    /// Returns a copy of the session, if it is live.
    pub fn get_session(&self, id: &str) -> Option<SessionRecord> {
        self.records.get(id)
    }

    /// Destroys the session and deletes its owned file.
    ///
    /// Returns false, with no side effect, if `id` is unknown. File deletion
    /// failures are logged and do not affect the result.
    pub fn clear_session(&self, id: &str) -> bool {
        self.clear_one(id).is_some()
    }

    /// Destroys every live session. Used by the shutdown hook.
    pub fn clear_all(&self) -> ClearReport {
        let ids = self.records.ids();
        info!(count = ids.len(), "clearing all sessions");

        let mut report = ClearReport::default();
        for id in ids {
            // A concurrent forget may have won the race; that id is simply skipped.
            if let Some(file_removed) = self.clear_one(id.as_str()) {
                report.sessions += 1;
                if file_removed {
                    report.files_removed += 1;
                }
            }
        }

        info!(
            sessions = report.sessions,
            files_removed = report.files_removed,
            "session cleanup complete"
        );
        report
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes one session. `None` if unknown, otherwise whether a file was deleted.
    fn clear_one(&self, id: &str) -> Option<bool> {
        let Some(record) = self.records.remove(id) else {
            warn!(session_id = id, "attempted to clear non-existent session");
            return None;
        };
        info!(session_id = id, mode = %record.mode(), "session cleared");

        Some(
            record
                .context
                .owned_file()
                .is_some_and(|path| release_owned_file(id, path)),
        )
    }
}

/// Deletes a session-owned file. Returns true if the file was removed.
fn release_owned_file(session_id: &str, path: &Path) -> bool {
    if !path.exists() {
        debug!(session_id, path = %path.display(), "owned file already gone");
        return false;
    }
    match std::fs::remove_file(path) {
        Ok(()) => {
            info!(session_id, path = %path.display(), "removed uploaded file");
            true
        }
        Err(e) => {
            error!(
                session_id,
                path = %path.display(),
                error = %e,
                "failed to remove uploaded file"
            );
            false
        }
    }
}
