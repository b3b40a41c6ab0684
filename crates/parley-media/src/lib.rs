// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document and image utilities plus the static file store.
//!
//! Decoding work is CPU-bound; the `*_async` variants move it onto tokio's
//! blocking pool so request handlers never run a parser on the reactor.

pub mod document;
pub mod error;
pub mod images;
pub mod store;

pub use document::{extract_pdf_text, extract_pdf_text_async, PDF_REJECTED};
pub use error::MediaError;
pub use images::{validate_image, validate_image_async, ImageInfo, IMAGE_REJECTED};
pub use store::{StaticStore, STATIC_ROUTE};
