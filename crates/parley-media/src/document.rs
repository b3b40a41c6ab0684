// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PDF text extraction.

use tracing::{debug, warn};

use crate::error::MediaError;

/// Message returned to callers when a PDF cannot be read.
pub const PDF_REJECTED: &str = "Failed to process PDF: the file could not be read as a PDF document.";

/// Extracts the text of every page, in order.
///
/// A readable PDF without a text layer yields an empty string; that is logged
/// and accepted.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, MediaError> {
    let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
        warn!(error = %e, size = bytes.len(), "pdf extraction failed");
        MediaError::InvalidInput(PDF_REJECTED.to_string())
    })?;

    if text.trim().is_empty() {
        warn!(size = bytes.len(), "no text extracted from pdf");
    } else {
        debug!(chars = text.chars().count(), "extracted pdf text");
    }
    Ok(text)
}

/// Runs [`extract_pdf_text`] on the blocking pool.
///
/// The parser panics on some malformed inputs; a panic is reported as
/// invalid input rather than tearing down the request. This relies on
/// unwinding, so no build profile may set `panic = "abort"`.
pub async fn extract_pdf_text_async(bytes: Vec<u8>) -> Result<String, MediaError> {
    run_parser(bytes, extract_pdf_text).await
}

async fn run_parser<F>(bytes: Vec<u8>, parse: F) -> Result<String, MediaError>
where
    F: FnOnce(&[u8]) -> Result<String, MediaError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || parse(&bytes)).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => {
            warn!("pdf parser panicked on uploaded document");
            Err(MediaError::InvalidInput(PDF_REJECTED.to_string()))
        }
        Err(e) => Err(MediaError::Worker(e.to_string())),
    }
}
