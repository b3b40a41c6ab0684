// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router-level tests for the gateway API using mock collaborators.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use parley_core::traits::SpeechSynthesizer;
use parley_gateway::handlers::INFERENCE_FALLBACK;
use parley_gateway::{router, GatewayState, PoolConfig, SynthesisPool, SYNTHESIS_FAILED};
use parley_media::StaticStore;
use parley_registry::Registries;
use parley_test_utils::{fixtures, MockInference, MockSynthesizer};
use serde_json::{json, Value};
use tower::ServiceExt;
use tracing_test::traced_test;

const BOUNDARY: &str = "parley-test-boundary";

struct TestApp {
    router: Router,
    registries: Registries,
    inference: Arc<MockInference>,
    pool: Option<SynthesisPool>,
    root: PathBuf,
    _dir: tempfile::TempDir,
}

impl TestApp {
    async fn new() -> Self {
        Self::build(MockInference::new(), None).await
    }

    async fn with_synthesizer(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self::build(MockInference::new(), Some(synthesizer)).await
    }

    async fn build(
        inference: MockInference,
        synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("static");
        let store = StaticStore::new(
            &root,
            root.join("uploads"),
            root.join("audio"),
            "http://localhost:8000",
        );
        store.ensure_dirs().await.unwrap();

        let registries = Registries::init();
        let inference = Arc::new(inference);
        let pool = synthesizer.map(|s| {
            SynthesisPool::start(
                s,
                store.clone(),
                Arc::clone(&registries.tasks),
                PoolConfig {
                    workers: 1,
                    queue_capacity: 8,
                },
            )
        });
        let state = GatewayState::new(
            registries.clone(),
            Arc::clone(&inference) as _,
            pool.as_ref().map(SynthesisPool::queue),
            store,
        );

        Self {
            router: router(state, 1024 * 1024),
            registries,
            inference,
            pool,
            root,
            _dir: dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    async fn upload(&self, mode: &str, filename: &str, bytes: &[u8]) -> (StatusCode, Value) {
        self.send(upload_request(mode, Some(filename), bytes)).await
    }

    async fn poll_terminal(&self, task_id: &str) -> Value {
        for _ in 0..200 {
            let (status, body) = self.send(get(&format!("/api/v1/tts/audio_status/{task_id}"))).await;
            assert_eq!(status, StatusCode::OK);
            if body["status"] != "processing" {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("task {task_id} never left processing");
    }

    fn upload_files(&self) -> Vec<PathBuf> {
        files_in(&self.root.join("uploads"))
    }
}

fn files_in(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_post(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn upload_request(mode: &str, filename: Option<&str>, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"mode\"\r\n\r\n{mode}\r\n"
        )
        .as_bytes(),
    );
    let disposition = match filename {
        Some(name) => format!("form-data; name=\"file\"; filename=\"{name}\""),
        None => "form-data; name=\"file\"".to_string(),
    };
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: {disposition}\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/v1/chat/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// ---- Upload ----

#[tokio::test]
async fn pdf_upload_creates_session_without_files() {
    let app = TestApp::new().await;
    let (status, body) = app
        .upload("upload_pdf", "notes.pdf", &fixtures::minimal_pdf("Hello world"))
        .await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["filename"], "notes.pdf");
    assert_eq!(body["mode"], "pdf");
    let session_id = body["session_id"].as_str().unwrap();
    assert_eq!(session_id.len(), 32);
    assert!(session_id.chars().all(|c| c.is_ascii_hexdigit()));

    let session = app.registries.sessions.get_session(session_id).unwrap();
    assert!(session.context.text_context().unwrap().contains("Hello"));
    assert!(app.upload_files().is_empty());
}

#[tokio::test]
async fn image_upload_stores_file_and_serves_it() {
    let app = TestApp::new().await;
    let png = fixtures::tiny_png();
    let (status, body) = app.upload("upload_image", "Cat.PNG", &png).await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["mode"], "image");

    let files = app.upload_files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].extension().unwrap(), "png");

    let session = app
        .registries
        .sessions
        .get_session(body["session_id"].as_str().unwrap())
        .unwrap();
    let url = session.context.image_url().unwrap();
    let name = files[0].file_name().unwrap().to_str().unwrap();
    assert_eq!(url, format!("http://localhost:8000/static/uploads/{name}"));

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/static/uploads/{name}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let served = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(served.as_ref(), png.as_slice());
}

#[tokio::test]
async fn image_is_stored_under_detected_format_not_client_name() {
    let app = TestApp::new().await;
    let (status, body) = app
        .upload("upload_image", "x.html", &fixtures::tiny_png())
        .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["filename"], "x.html");

    let files = app.upload_files();
    assert_eq!(files[0].extension().unwrap(), "png");
    let name = files[0].file_name().unwrap().to_str().unwrap();

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/static/uploads/{name}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
}

#[tokio::test]
async fn upload_without_filename_reports_fallback() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(upload_request("upload_image", None, &fixtures::tiny_png()))
        .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["filename"], "uploaded_file");
    assert_eq!(app.upload_files()[0].extension().unwrap(), "png");
}

#[tokio::test]
#[traced_test]
async fn invalid_mode_is_rejected() {
    let app = TestApp::new().await;
    let (status, body) = app.upload("upload_audio", "a.wav", b"RIFF").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        "Invalid mode specified. Use 'upload_pdf' or 'upload_image'."
    );
    assert!(app.registries.sessions.is_empty());
    assert!(logs_contain("invalid upload mode received"));
}

#[tokio::test]
async fn invalid_image_is_rejected_without_leaving_a_file() {
    let app = TestApp::new().await;
    let (status, body) = app.upload("upload_image", "cat.png", b"not an image").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], parley_media::IMAGE_REJECTED);
    assert!(app.upload_files().is_empty());
    assert!(app.registries.sessions.is_empty());
}

#[tokio::test]
async fn invalid_pdf_is_rejected() {
    let app = TestApp::new().await;
    let (status, body) = app.upload("upload_pdf", "doc.pdf", b"%PDF-broken").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], parley_media::PDF_REJECTED);
    assert!(app.registries.sessions.is_empty());
}

#[tokio::test]
async fn upload_over_the_body_limit_is_refused() {
    let app = TestApp::new().await;
    let huge = vec![0u8; 2 * 1024 * 1024];
    let (status, _) = app.upload("upload_pdf", "big.pdf", &huge).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.registries.sessions.is_empty());
}

// ---- Ask ----

#[tokio::test]
async fn ask_with_pdf_session_passes_context() {
    let app = TestApp::new().await;
    app.inference.add_answer("It greets the world.").await;
    let (_, upload) = app
        .upload("upload_pdf", "hello.pdf", &fixtures::minimal_pdf("Hello world"))
        .await;

    let (status, body) = app
        .send(json_post(
            "/api/v1/chat/ask",
            json!({"question": "What is this about?", "session_id": upload["session_id"]}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "It greets the world.");
    assert_eq!(body["tts_task_id"], Value::Null);

    let request = app.inference.last_request().await.unwrap();
    assert_eq!(request.question, "What is this about?");
    assert!(request.text_context.unwrap().contains("Hello"));
    assert!(request.image_url.is_none());
}

#[tokio::test]
async fn ask_with_image_session_passes_url() {
    let app = TestApp::new().await;
    let (_, upload) = app
        .upload("upload_image", "cat.png", &fixtures::tiny_png())
        .await;

    let (status, _) = app
        .send(json_post(
            "/api/v1/chat/ask",
            json!({"question": "What is shown?", "session_id": upload["session_id"]}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let request = app.inference.last_request().await.unwrap();
    assert!(request.text_context.is_none());
    assert!(request
        .image_url
        .unwrap()
        .starts_with("http://localhost:8000/static/uploads/"));
}

#[tokio::test]
#[traced_test]
async fn ask_with_unknown_session_answers_without_context() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(form_post(
            "/api/v1/chat/ask",
            "question=Hello&session_id=00000000000000000000000000000000",
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "mock answer");

    let request = app.inference.last_request().await.unwrap();
    assert!(request.text_context.is_none() && request.image_url.is_none());
    assert!(logs_contain("session not found, answering without context"));
}

#[tokio::test]
async fn ask_substitutes_answer_when_inference_fails() {
    let app = TestApp::new().await;
    app.inference.set_failing(true);
    let (status, body) = app
        .send(json_post("/api/v1/chat/ask", json!({"question": "Hi"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], INFERENCE_FALLBACK);
}

#[tokio::test]
async fn ask_requires_a_question() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(json_post("/api/v1/chat/ask", json!({"tts": false})))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("question"));
}

#[tokio::test]
#[traced_test]
async fn tts_without_capability_omits_task_id() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send(json_post(
            "/api/v1/chat/ask",
            json!({"question": "Hi", "tts": true}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tts_task_id"], Value::Null);
    assert!(app.registries.tasks.is_empty());
    assert!(logs_contain("speech synthesis requested but not available"));
}

#[tokio::test]
async fn tts_task_moves_from_processing_to_done() {
    let (mock, gate) = MockSynthesizer::gated();
    let app = TestApp::with_synthesizer(Arc::new(mock)).await;
    app.inference.add_answer("Spoken answer.").await;

    let (status, body) = app
        .send(json_post(
            "/api/v1/chat/ask",
            json!({"question": "Say something", "tts": true}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let task_id = body["tts_task_id"].as_str().unwrap().to_string();

    let (_, pending) = app
        .send(get(&format!("/api/v1/tts/audio_status/{task_id}")))
        .await;
    assert_eq!(
        pending,
        json!({"status": "processing", "audio_url": null, "error": null})
    );

    gate.release(1);
    let done = app.poll_terminal(&task_id).await;
    assert_eq!(done["status"], "done");
    assert_eq!(
        done["audio_url"],
        format!("http://localhost:8000/static/audio/audio_{task_id}.wav")
    );

    // Terminal state is stable across polls.
    let (_, again) = app
        .send(get(&format!("/api/v1/tts/audio_status/{task_id}")))
        .await;
    assert_eq!(again, done);

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/static/audio/audio_{task_id}.wav")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    if let Some(pool) = app.pool {
        pool.shutdown().await;
    }
}

#[tokio::test]
async fn tts_failure_is_reported_without_internal_detail() {
    let app = TestApp::with_synthesizer(Arc::new(MockSynthesizer::failing(
        "HTTP request failed: error sending request for url (http://10.1.2.3:5002/v1/audio/speech)",
    )))
    .await;
    let (_, body) = app
        .send(form_post("/api/v1/chat/ask", "question=Hi&tts=true"))
        .await;
    let task_id = body["tts_task_id"].as_str().unwrap().to_string();

    let failed = app.poll_terminal(&task_id).await;
    assert_eq!(failed["status"], "failed");
    assert_eq!(failed["error"], SYNTHESIS_FAILED);
    assert!(!failed.to_string().contains("10.1.2.3"));
    assert_eq!(failed["audio_url"], Value::Null);
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let app = TestApp::new().await;
    let (status, body) = app.send(get("/api/v1/tts/audio_status/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Task not found");
}

// ---- Forget ----

#[tokio::test]
async fn forget_removes_session_and_its_file() {
    let app = TestApp::new().await;
    let (_, upload) = app
        .upload("upload_image", "cat.png", &fixtures::tiny_png())
        .await;
    assert_eq!(app.upload_files().len(), 1);

    let (status, body) = app
        .send(json_post(
            "/api/v1/chat/forget",
            json!({"session_id": upload["session_id"]}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Session cleared successfully.");
    assert!(app.registries.sessions.is_empty());
    assert!(app.upload_files().is_empty());

    // A second forget finds nothing.
    let (status, _) = app
        .send(json_post(
            "/api/v1/chat/forget",
            json!({"session_id": upload["session_id"]}),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn forget_unknown_session_leaves_registry_unchanged() {
    let app = TestApp::new().await;
    app.upload("upload_pdf", "a.pdf", &fixtures::minimal_pdf("A"))
        .await;
    assert_eq!(app.registries.sessions.len(), 1);

    let (status, body) = app
        .send(form_post("/api/v1/chat/forget", "session_id=unknown"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Session not found.");
    assert_eq!(app.registries.sessions.len(), 1);
}

// ---- Health and root ----

#[tokio::test]
async fn health_reports_counts_and_capability() {
    let app = TestApp::with_synthesizer(Arc::new(MockSynthesizer::new())).await;
    app.upload("upload_pdf", "a.pdf", &fixtures::minimal_pdf("A"))
        .await;

    let (status, body) = app.send(get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["sessions"], 1);
    assert_eq!(body["tasks"], 0);
    assert_eq!(body["synthesis"], "enabled");

    let (_, root) = app.send(get("/")).await;
    assert!(root["message"].as_str().unwrap().starts_with("Welcome"));
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .uri("/api/v1/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
