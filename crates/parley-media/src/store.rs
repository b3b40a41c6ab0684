// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static file store for uploads and synthesized audio.
//!
//! Files live under a single static root that the gateway serves at
//! [`STATIC_ROUTE`]. Every file name is a fresh [`RecordId`], so no two
//! writers ever share a path.

use std::path::{Component, Path, PathBuf};

use parley_registry::RecordId;
use tracing::info;

use crate::error::MediaError;

/// URL path under which the static root is served.
pub const STATIC_ROUTE: &str = "/static";

/// Owns the upload and audio directories and renders their public URLs.
#[derive(Debug, Clone)]
pub struct StaticStore {
    static_dir: PathBuf,
    upload_dir: PathBuf,
    audio_dir: PathBuf,
    public_base_url: String,
}

impl StaticStore {
    /// `upload_dir` and `audio_dir` must live under `static_dir` for their
    /// files to be reachable over HTTP.
    pub fn new(
        static_dir: impl Into<PathBuf>,
        upload_dir: impl Into<PathBuf>,
        audio_dir: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            static_dir: static_dir.into(),
            upload_dir: upload_dir.into(),
            audio_dir: audio_dir.into(),
            public_base_url,
        }
    }

    pub fn static_dir(&self) -> &Path {
        &self.static_dir
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    /// Creates the upload and audio directories if they are missing.
    pub async fn ensure_dirs(&self) -> Result<(), MediaError> {
        for dir in [&self.static_dir, &self.upload_dir, &self.audio_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| MediaError::io(dir, e))?;
        }
        info!(
            uploads = %self.upload_dir.display(),
            audio = %self.audio_dir.display(),
            "static directories ready"
        );
        Ok(())
    }

    /// Writes an upload under a fresh name and returns its path.
    ///
    /// `extension` comes from the detected content format, never from the
    /// client's file name, since it decides the type `/static` serves.
    pub async fn save_upload(&self, bytes: &[u8], extension: &str) -> Result<PathBuf, MediaError> {
        let path = self
            .upload_dir
            .join(format!("{}.{extension}", RecordId::generate()));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| MediaError::io(&path, e))?;
        info!(path = %path.display(), size = bytes.len(), "saved uploaded file");
        Ok(path)
    }

    /// Where the audio for `task_id` is written.
    pub fn audio_path(&self, task_id: &str, format: &str) -> PathBuf {
        self.audio_dir.join(format!("audio_{task_id}.{format}"))
    }

    /// Public URL of a file under the static root.
    pub fn public_url(&self, path: &Path) -> Result<String, MediaError> {
        let relative = path
            .strip_prefix(&self.static_dir)
            .map_err(|_| MediaError::OutsideStaticRoot(path.to_path_buf()))?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_string_lossy()),
                Component::CurDir => {}
                _ => return Err(MediaError::OutsideStaticRoot(path.to_path_buf())),
            }
        }
        if segments.is_empty() {
            return Err(MediaError::OutsideStaticRoot(path.to_path_buf()));
        }

        Ok(format!(
            "{}{STATIC_ROUTE}/{}",
            self.public_base_url,
            segments.join("/")
        ))
    }
}
