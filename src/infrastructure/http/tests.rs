//! HTTP 场景测试：在进程内驱动完整的 Router

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt;

use crate::application::{JobStorePort, SynthesisEnginePort, UploadPolicy};
use crate::domain::{JobId, JobStatus};
use crate::infrastructure::adapters::{
    silent_wav, FakeEngineMode, FakeSynthesisEngine, FakeSynthesisEngineConfig, FileJobStorage,
    SymphoniaProbe,
};
use crate::infrastructure::events::JobEventPublisher;
use crate::infrastructure::http::{build_router, AppState, ServerConfig, StateOptions};
use crate::infrastructure::memory::{BoundedJobQueue, InMemoryJobStore};
use crate::infrastructure::worker::{CloneWorkerConfig, CloneWorkerPool};

const BOUNDARY: &str = "voxclone-test-boundary";

struct TestApp {
    router: Router,
    store: Arc<dyn JobStorePort>,
    _dir: TempDir,
}

struct AppOptions {
    engine: Arc<dyn SynthesisEnginePort>,
    queue_capacity: usize,
    engine_timeout: Duration,
    sync_wait_timeout: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            engine: Arc::new(FakeSynthesisEngine::with_mode(FakeEngineMode::Succeed)),
            queue_capacity: 8,
            engine_timeout: Duration::from_secs(5),
            sync_wait_timeout: Duration::from_secs(5),
        }
    }
}

impl TestApp {
    async fn new(options: AppOptions) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn JobStorePort> = Arc::new(InMemoryJobStore::new(100));
        let (queue, receiver) = BoundedJobQueue::new(options.queue_capacity);
        let queue = queue.arc();
        let storage = Arc::new(FileJobStorage::new(dir.path()).await.unwrap());
        let events = JobEventPublisher::new().arc();

        let pool = CloneWorkerPool::new(
            CloneWorkerConfig {
                pool_size: 1,
                engine_timeout: options.engine_timeout,
            },
            receiver,
            store.clone(),
            storage.clone(),
            options.engine.clone(),
            Arc::new(SymphoniaProbe::new()),
            events.clone(),
        );
        let stats = pool.stats();
        pool.start();

        let state = AppState::new(
            store.clone(),
            queue,
            storage,
            options.engine,
            events,
            stats,
            StateOptions {
                upload_policy: UploadPolicy::default(),
                sync_wait_timeout: options.sync_wait_timeout,
                base_url: String::new(),
            },
        );

        Self {
            router: build_router(&ServerConfig::default(), Arc::new(state)),
            store,
            _dir: dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str) -> Response {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post_form(&self, uri: &str, form: Vec<u8>) -> Response {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(form))
                .unwrap(),
        )
        .await
    }

    async fn submit_async(&self, text: &str) -> JobId {
        let response = self
            .post_form("/api/clone/async", clone_form(text, "English"))
            .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body = json_body(response).await;
        JobId::parse(body["data"]["id"].as_str().unwrap()).unwrap()
    }

    async fn wait_for_status(&self, job_id: JobId, status: JobStatus) {
        for _ in 0..250 {
            if self.store.get(job_id).unwrap().status() == status {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("job {} never reached {}", job_id, status);
    }
}

fn multipart_form(
    text: Option<&str>,
    language: Option<&str>,
    audio: Option<(&str, &str, Vec<u8>)>,
) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in [("text", text), ("language", language)] {
        if let Some(value) = value {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
    }

    if let Some((file_name, content_type, data)) = audio {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, file_name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(&data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn clone_form(text: &str, language: &str) -> Vec<u8> {
    multipart_form(
        Some(text),
        Some(language),
        Some(("speaker.wav", "audio/wav", silent_wav(16000, 1, 1600))),
    )
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn hanging_engine() -> Arc<dyn SynthesisEnginePort> {
    Arc::new(FakeSynthesisEngine::with_mode(FakeEngineMode::Hang))
}

#[tokio::test]
async fn test_async_clone_lifecycle() {
    let app = TestApp::new(AppOptions::default()).await;

    let response = app
        .post_form("/api/clone/async", clone_form("Hello world", "English"))
        .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = json_body(response).await;
    assert_eq!(body["errno"], 0);
    assert_eq!(body["data"]["status"], "queued");
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status_url"], format!("/api/jobs/{}", id));
    assert_eq!(body["data"]["result_url"], format!("/api/jobs/{}/result", id));

    let job_id = JobId::parse(&id).unwrap();
    app.wait_for_status(job_id, JobStatus::Succeeded).await;

    let body = json_body(app.get(&format!("/api/jobs/{}", id)).await).await;
    assert_eq!(body["data"]["status"], "succeeded");
    assert_eq!(body["data"]["language"], "English");
    assert!(body["data"]["result"]["size_bytes"].as_u64().unwrap() > 44);
    assert!(body["data"].get("error").is_none());

    let response = app.get(&format!("/api/jobs/{}/result", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
    assert_eq!(response.headers()["x-job-id"], id.as_str());
    let audio = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&audio[0..4], b"RIFF");
}

#[tokio::test]
async fn test_unknown_language_creates_no_job() {
    let app = TestApp::new(AppOptions::default()).await;

    let response = app
        .post_form("/api/clone/async", clone_form("Hello world", "Klingon"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["errno"], 400);
    assert!(app.store.list().is_empty());
}

#[tokio::test]
async fn test_text_over_cap_creates_no_job() {
    let app = TestApp::new(AppOptions::default()).await;
    let text = "a".repeat(2001);

    let response = app
        .post_form("/api/clone/async", clone_form(&text, "English"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.store.list().is_empty());

    let body = json_body(app.get("/api/jobs").await).await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn test_invalid_audio_rejected() {
    let app = TestApp::new(AppOptions::default()).await;

    let missing = multipart_form(Some("Hello world"), Some("English"), None);
    let response = app.post_form("/api/clone/async", missing).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let wrong_ext = multipart_form(
        Some("Hello world"),
        Some("English"),
        Some(("notes.txt", "text/plain", b"hello".to_vec())),
    );
    let response = app.post_form("/api/clone/async", wrong_ext).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(app.store.list().is_empty());
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let app = TestApp::new(AppOptions::default()).await;

    let response = app.get(&format!("/api/jobs/{}", JobId::new())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/api/jobs/not-a-uuid/result").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_result_not_ready_while_running() {
    let app = TestApp::new(AppOptions {
        engine: hanging_engine(),
        engine_timeout: Duration::from_secs(30),
        ..Default::default()
    })
    .await;

    let job_id = app.submit_async("Hello world").await;
    let response = app.get(&format!("/api/jobs/{}/result", job_id)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    app.wait_for_status(job_id, JobStatus::Running).await;
    let response = app.get(&format!("/api/jobs/{}/result", job_id)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .send(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/jobs/{}", job_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_queue_full_is_rejected_without_job() {
    let app = TestApp::new(AppOptions {
        engine: hanging_engine(),
        queue_capacity: 1,
        engine_timeout: Duration::from_secs(30),
        ..Default::default()
    })
    .await;

    let running = app.submit_async("first job").await;
    app.wait_for_status(running, JobStatus::Running).await;
    let queued = app.submit_async("second job").await;

    let response = app
        .post_form("/api/clone/async", clone_form("third job", "English"))
        .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let jobs = app.store.list();
    assert_eq!(jobs.len(), 2);
    assert_eq!(app.store.get(queued).unwrap().status(), JobStatus::Queued);
}

#[tokio::test]
async fn test_engine_timeout_fails_job() {
    let app = TestApp::new(AppOptions {
        engine: hanging_engine(),
        engine_timeout: Duration::from_millis(100),
        ..Default::default()
    })
    .await;

    let job_id = app.submit_async("Hello world").await;
    app.wait_for_status(job_id, JobStatus::Failed).await;

    let body = json_body(app.get(&format!("/api/jobs/{}", job_id)).await).await;
    assert_eq!(body["data"]["error"]["kind"], "timeout");

    let response = app.get(&format!("/api/jobs/{}/result", job_id)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["data"]["kind"], "timeout");
}

#[tokio::test]
async fn test_sync_clone_returns_audio() {
    let app = TestApp::new(AppOptions::default()).await;

    let response = app
        .post_form("/api/clone", clone_form("Hello world", "en"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
    assert!(response.headers().contains_key("x-job-id"));
    assert!(response.headers().contains_key("x-audio-duration-ms"));

    let audio = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&audio[0..4], b"RIFF");
}

#[tokio::test]
async fn test_sync_clone_surfaces_failure() {
    let app = TestApp::new(AppOptions {
        engine: Arc::new(FakeSynthesisEngine::with_mode(FakeEngineMode::Fail)),
        ..Default::default()
    })
    .await;

    let response = app
        .post_form("/api/clone", clone_form("Hello world", "English"))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["errno"], 500);
    assert_eq!(body["data"]["kind"], "engine_failure");
}

#[tokio::test]
async fn test_sync_clone_wait_timeout() {
    let app = TestApp::new(AppOptions {
        engine: Arc::new(FakeSynthesisEngine::new(FakeSynthesisEngineConfig {
            delay: Duration::from_secs(2),
            mode: FakeEngineMode::Succeed,
        })),
        sync_wait_timeout: Duration::from_millis(200),
        ..Default::default()
    })
    .await;

    let response = app
        .post_form("/api/clone", clone_form("Hello world", "English"))
        .await;
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = json_body(response).await;
    let job_id = JobId::parse(body["data"]["job_id"].as_str().unwrap()).unwrap();

    // 任务继续执行，客户端可以轮询
    app.wait_for_status(job_id, JobStatus::Succeeded).await;
}

#[tokio::test]
async fn test_list_and_delete_jobs() {
    let app = TestApp::new(AppOptions::default()).await;

    let first = app.submit_async("first job").await;
    let second = app.submit_async("second job").await;
    app.wait_for_status(second, JobStatus::Succeeded).await;

    let body = json_body(app.get("/api/jobs?limit=1").await).await;
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["jobs"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["jobs"][0]["id"], second.to_string());

    app.wait_for_status(first, JobStatus::Succeeded).await;
    let response = app
        .send(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/jobs/{}", first))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get(&format!("/api/jobs/{}", first)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_languages() {
    let app = TestApp::new(AppOptions::default()).await;

    let response = app.get("/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["engine"], "fake");
    assert_eq!(body["data"]["workers"], 1);
    assert_eq!(body["data"]["queue_capacity"], 8);
    assert_eq!(body["data"]["jobs"]["queued"], 0);

    let body = json_body(app.get("/api/languages").await).await;
    assert_eq!(body["data"]["count"], 17);
    assert_eq!(body["data"]["languages"][0]["name"], "English");
    assert_eq!(body["data"]["languages"][0]["code"], "en");
}
