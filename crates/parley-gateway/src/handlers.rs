// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Multipart, Path, Request, State};
use axum::Json;
use parley_core::types::{GenerationRequest, SessionMode, TaskStatus};
use parley_media::{extract_pdf_text_async, validate_image_async, MediaError};
use parley_registry::SessionContext;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::form::read_fields;
use crate::server::GatewayState;

/// Answer given when the inference provider fails.
pub const INFERENCE_FALLBACK: &str = "Sorry, an error occurred while processing your request.";

/// File name reported when the upload carried none.
const DEFAULT_FILENAME: &str = "uploaded_file";

/// Upload mode selected by the `mode` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    UploadPdf,
    UploadImage,
}

impl UploadMode {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "upload_pdf" => Some(UploadMode::UploadPdf),
            "upload_image" => Some(UploadMode::UploadImage),
            _ => None,
        }
    }

    fn session_mode(self) -> SessionMode {
        match self {
            UploadMode::UploadPdf => SessionMode::Pdf,
            UploadMode::UploadImage => SessionMode::Image,
        }
    }
}

/// Response body for POST /api/v1/chat/upload.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub session_id: String,
    pub filename: String,
    pub mode: SessionMode,
}

/// Response body for POST /api/v1/chat/ask.
#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub tts_task_id: Option<String>,
}

/// Response body for POST /api/v1/chat/forget.
#[derive(Debug, Serialize, Deserialize)]
pub struct ForgetResponse {
    pub message: String,
}

/// Response body for GET /api/v1/tts/audio_status/{task_id}.
#[derive(Debug, Serialize, Deserialize)]
pub struct AudioStatusResponse {
    pub status: TaskStatus,
    pub audio_url: Option<String>,
    pub error: Option<String>,
}

/// Response body for GET /api/v1/health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub sessions: usize,
    pub tasks: usize,
    /// "enabled" or "disabled".
    pub synthesis: String,
}

/// Response body for GET /.
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

/// Uploaded file as read from the multipart body.
struct UploadedFile {
    name: Option<String>,
    bytes: Bytes,
}

/// POST /api/v1/chat/upload
///
/// Extracts text from a PDF or stores a validated image, then opens a session
/// holding that context.
pub async fn upload(
    State(state): State<GatewayState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut mode = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("mode") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
                mode = Some(text);
            }
            Some("file") => {
                let name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
                file = Some(UploadedFile { name, bytes });
            }
            _ => {}
        }
    }

    let mode_value = mode.ok_or_else(|| ApiError::unprocessable("Missing required field `mode`."))?;
    let Some(mode) = UploadMode::parse(&mode_value) else {
        warn!(mode = %mode_value, "invalid upload mode received");
        return Err(ApiError::bad_request(
            "Invalid mode specified. Use 'upload_pdf' or 'upload_image'.",
        ));
    };
    let file = file.ok_or_else(|| ApiError::unprocessable("Missing required field `file`."))?;

    let session_mode = mode.session_mode();
    let context = match mode {
        UploadMode::UploadPdf => pdf_context(&file).await,
        UploadMode::UploadImage => image_context(&state, &file).await,
    }
    .map_err(|e| upload_error(e, session_mode, file.name.as_deref()))?;

    let session_id = state.registries.sessions.create_session(context);
    Ok(Json(UploadResponse {
        session_id: session_id.into(),
        filename: file.name.unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
        mode: session_mode,
    }))
}

async fn pdf_context(file: &UploadedFile) -> Result<SessionContext, MediaError> {
    let text_context = extract_pdf_text_async(file.bytes.to_vec()).await?;
    Ok(SessionContext::Pdf { text_context })
}

async fn image_context(
    state: &GatewayState,
    file: &UploadedFile,
) -> Result<SessionContext, MediaError> {
    let bytes: Arc<[u8]> = Arc::from(file.bytes.as_ref());
    let info = validate_image_async(Arc::clone(&bytes)).await?;
    let file_path = state.store.save_upload(&bytes, info.extension()).await?;
    let image_url = match state.store.public_url(&file_path) {
        Ok(url) => url,
        Err(e) => {
            if let Err(remove) = tokio::fs::remove_file(&file_path).await {
                warn!(path = %file_path.display(), error = %remove, "failed to remove unreachable upload");
            }
            return Err(e);
        }
    };
    Ok(SessionContext::Image {
        image_url,
        file_path,
    })
}

fn upload_error(err: MediaError, mode: SessionMode, filename: Option<&str>) -> ApiError {
    let filename = filename.unwrap_or(DEFAULT_FILENAME);
    if err.is_client_error() {
        warn!(filename, mode = %mode, error = %err, "file processing error");
        ApiError::bad_request(err.to_string())
    } else {
        error!(filename, mode = %mode, error = %err, "unexpected error during upload");
        ApiError::internal(format!("Internal server error processing {mode}."))
    }
}

/// POST /api/v1/chat/ask
///
/// Answers a question, with the session's document text or image when a
/// known `session_id` is given, and optionally queues speech synthesis.
pub async fn ask(
    State(state): State<GatewayState>,
    req: Request,
) -> Result<Json<AskResponse>, ApiError> {
    let fields = read_fields(req).await?;
    let question = fields.required("question")?.to_string();
    let session_id = fields.optional("session_id");
    let wants_speech = fields.flag("tts")?;

    let mut request = GenerationRequest::new(question);
    if let Some(id) = session_id {
        match state.registries.sessions.get_session(id) {
            Some(session) => {
                info!(session_id = %id, mode = %session.mode(), "answering with session context");
                request.text_context = session.context.text_context().map(str::to_string);
                request.image_url = session.context.image_url().map(str::to_string);
            }
            None => {
                warn!(session_id = %id, "session not found, answering without context");
            }
        }
    }

    let answer = match state.inference.generate(request).await {
        Ok(answer) => answer,
        Err(e) => {
            error!(error = %e, "inference failed");
            INFERENCE_FALLBACK.to_string()
        }
    };

    let tts_task_id = match (wants_speech, &state.synthesis) {
        (true, Some(queue)) => {
            let task_id = queue.submit(answer.clone());
            info!(task_id = %task_id, "speech synthesis requested");
            Some(task_id.into())
        }
        (true, None) => {
            warn!("speech synthesis requested but not available");
            None
        }
        (false, _) => None,
    };

    Ok(Json(AskResponse {
        answer,
        tts_task_id,
    }))
}

/// POST /api/v1/chat/forget
pub async fn forget(
    State(state): State<GatewayState>,
    req: Request,
) -> Result<Json<ForgetResponse>, ApiError> {
    let fields = read_fields(req).await?;
    let session_id = fields.required("session_id")?;

    if state.registries.sessions.clear_session(session_id) {
        Ok(Json(ForgetResponse {
            message: "Session cleared successfully.".to_string(),
        }))
    } else {
        warn!(session_id = %session_id, "forget request for non-existent session");
        Err(ApiError::not_found("Session not found."))
    }
}

/// GET /api/v1/tts/audio_status/{task_id}
pub async fn audio_status(
    State(state): State<GatewayState>,
    Path(task_id): Path<String>,
) -> Result<Json<AudioStatusResponse>, ApiError> {
    match state.registries.tasks.get_task(&task_id) {
        Some(task) => {
            debug!(task_id = %task_id, status = %task.status, "task status retrieved");
            Ok(Json(AudioStatusResponse {
                status: task.status,
                audio_url: task.result_reference,
                error: task.error_message,
            }))
        }
        None => {
            warn!(task_id = %task_id, "status request for unknown task");
            Err(ApiError::not_found("Task not found"))
        }
    }
}

/// GET /api/v1/health
pub async fn health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let synthesis = match &state.synthesis {
        Some(queue) if !queue.is_closed() => "enabled",
        _ => "disabled",
    };
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        sessions: state.registries.sessions.len(),
        tasks: state.registries.tasks.len(),
        synthesis: synthesis.to_string(),
    })
}

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Welcome to the Parley chat assistant API!".to_string(),
    })
}
