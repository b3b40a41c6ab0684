// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content-type aware form parsing.
//!
//! The question and forget endpoints accept the same fields as a JSON object,
//! an urlencoded form or a multipart form. All three are flattened into
//! [`FormFields`] before the handler reads them.

use std::collections::HashMap;

use axum::extract::{Form, Multipart, Request};
use axum::http::{header, StatusCode};
use axum::{Json, RequestExt};
use serde_json::Value;

use crate::error::ApiError;

/// Text fields of a submitted form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormFields(HashMap<String, String>);

impl FormFields {
    /// A field's value. Blank values count as absent.
    pub fn optional(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// A field that must be present.
    pub fn required(&self, name: &str) -> Result<&str, ApiError> {
        self.0
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ApiError::unprocessable(format!("Missing required field `{name}`.")))
    }

    /// A boolean flag; absent means `false`.
    pub fn flag(&self, name: &str) -> Result<bool, ApiError> {
        match self.optional(name) {
            None => Ok(false),
            Some(value) => parse_flag(value).ok_or_else(|| {
                ApiError::unprocessable(format!("Field `{name}` must be a boolean."))
            }),
        }
    }
}

impl<const N: usize> From<[(&str, &str); N]> for FormFields {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Reads the request body as form fields, dispatching on `Content-Type`.
pub async fn read_fields(req: Request) -> Result<FormFields, ApiError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/json") {
        let Json(object) = req
            .extract::<Json<serde_json::Map<String, Value>>, _>()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
        return Ok(from_json(object));
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(fields) = req
            .extract::<Form<HashMap<String, String>>, _>()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
        return Ok(FormFields(fields));
    }

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = req
            .extract::<Multipart, _>()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;

        let mut fields = HashMap::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if field.file_name().is_some() {
                continue;
            }
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
            fields.insert(name, text);
        }
        return Ok(FormFields(fields));
    }

    Err(ApiError::new(
        StatusCode::UNSUPPORTED_MEDIA_TYPE,
        "Send the form as JSON, urlencoded or multipart form data.",
    ))
}

fn from_json(object: serde_json::Map<String, Value>) -> FormFields {
    let fields = object
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                other => other.to_string(),
            };
            Some((key, text))
        })
        .collect();
    FormFields(fields)
}
