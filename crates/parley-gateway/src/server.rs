// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use parley_core::traits::InferenceProvider;
use parley_core::ParleyError;
use parley_media::{StaticStore, STATIC_ROUTE};
use parley_registry::Registries;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::synthesis::SynthesisQueue;

/// Prefix under which all API routes are nested.
pub const API_PREFIX: &str = "/api/v1";

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Session and task registries.
    pub registries: Registries,
    /// Answers questions.
    pub inference: Arc<dyn InferenceProvider>,
    /// Present only when speech synthesis was resolved as available at startup.
    pub synthesis: Option<SynthesisQueue>,
    /// Upload and audio storage.
    pub store: StaticStore,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(
        registries: Registries,
        inference: Arc<dyn InferenceProvider>,
        synthesis: Option<SynthesisQueue>,
        store: StaticStore,
    ) -> Self {
        Self {
            registries,
            inference,
            synthesis,
            store,
            start_time: Instant::now(),
        }
    }
}

/// Builds the application router.
///
/// - POST /api/v1/chat/upload
/// - POST /api/v1/chat/ask
/// - POST /api/v1/chat/forget
/// - GET /api/v1/tts/audio_status/{task_id}
/// - GET /api/v1/health
/// - GET /
/// - GET /static/... (uploads and audio)
pub fn router(state: GatewayState, max_upload_bytes: usize) -> Router {
    let static_files = ServeDir::new(state.store.static_dir());

    let api_routes = Router::new()
        .route("/chat/upload", post(handlers::upload))
        .route("/chat/ask", post(handlers::ask))
        .route("/chat/forget", post(handlers::forget))
        .route("/tts/audio_status/{task_id}", get(handlers::audio_status))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    Router::new()
        .route("/", get(handlers::root))
        .nest(API_PREFIX, api_routes)
        .nest_service(STATIC_ROUTE, static_files)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serves `app` on `listener` until `shutdown` resolves, then lets in-flight
/// requests finish.
pub async fn start_server(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ParleyError> {
    let addr = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "<unknown>".to_string());
    tracing::info!(addr = %addr, "gateway server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ParleyError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway server stopped");
    Ok(())
}

/// Binds a listener on `addr` (`host:port`).
pub async fn bind(addr: &str) -> Result<TcpListener, ParleyError> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| ParleyError::Config(format!("failed to bind gateway to {addr}: {e}")))
}
