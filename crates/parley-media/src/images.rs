// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image validation.

use image::ImageFormat;
use tracing::{debug, warn};

use crate::error::MediaError;

/// Message returned to callers when an upload is not a decodable image.
pub const IMAGE_REJECTED: &str = "Uploaded file is not a valid image.";

/// Facts about an image that decoded successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    /// Canonical file extension for the detected format.
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("img")
    }
}

/// Sniffs the format and fully decodes the image.
///
/// Truncated or corrupt files whose header looks valid are rejected too.
pub fn validate_image(bytes: &[u8]) -> Result<ImageInfo, MediaError> {
    let format = image::guess_format(bytes).map_err(|e| {
        warn!(error = %e, size = bytes.len(), "unrecognised image format");
        MediaError::InvalidInput(IMAGE_REJECTED.to_string())
    })?;

    let decoded = image::load_from_memory_with_format(bytes, format).map_err(|e| {
        warn!(error = %e, ?format, "image failed to decode");
        MediaError::InvalidInput(IMAGE_REJECTED.to_string())
    })?;

    let info = ImageInfo {
        format,
        width: decoded.width(),
        height: decoded.height(),
    };
    debug!(
        format = ?info.format,
        width = info.width,
        height = info.height,
        "image validated"
    );
    Ok(info)
}

/// Runs [`validate_image`] on the blocking pool.
pub async fn validate_image_async(bytes: std::sync::Arc<[u8]>) -> Result<ImageInfo, MediaError> {
    match tokio::task::spawn_blocking(move || validate_image(&bytes)).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(MediaError::InvalidInput(IMAGE_REJECTED.to_string())),
        Err(e) => Err(MediaError::Worker(e.to_string())),
    }
}
