//! Shared harness for HTTP-level tests.
//!
//! Builds the full router around an in-memory registry and a scratch upload
//! directory. Engines are injected so runs never need ffmpeg.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use futures_util::stream::{self, StreamExt};
use futures_util::FutureExt;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use ladder_backend::app::create_app;
use ladder_backend::common::error::{JobError, JobResult};
use ladder_backend::config::settings::AppConfig;
use ladder_backend::infrastructure::engine::{EngineRun, TranscodeEngine};
use ladder_backend::modules::jobs::collector::rendition_file_name;
use ladder_backend::modules::jobs::repository::InMemoryJobRegistry;
use ladder_backend::state::AppState;
use ladder_backend::workers::transcoder::output_dir_for;

pub const BOUNDARY: &str = "ladder-test-boundary";

/// In-process stand-in for the engine binary.
#[derive(Default)]
pub struct ScriptEngine {
    /// Heights to write as `<stem> <height>.mp4`.
    pub heights: Vec<u32>,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub code: i32,
}

impl ScriptEngine {
    pub fn succeeding(heights: &[u32]) -> Self {
        let mut stdout = vec![format!("Input video resolution: {}p", heights[0])];
        for height in &heights[1..] {
            stdout.push(format!("Processing {}p...", height));
            stdout.push(format!("✓ {}p completed", height));
        }
        Self {
            heights: heights.to_vec(),
            stdout,
            ..Default::default()
        }
    }

    pub fn failing(code: i32, stderr: &str) -> Self {
        Self {
            stdout: vec!["Processing 720p...".to_string()],
            stderr: vec![stderr.to_string()],
            code,
            ..Default::default()
        }
    }
}

impl TranscodeEngine for ScriptEngine {
    fn locate(&self) -> JobResult<PathBuf> {
        Ok(PathBuf::from("ladder-engine"))
    }

    fn launch(&self, _program: &Path, source: &Path) -> JobResult<EngineRun> {
        if !self.heights.is_empty() {
            let dir = output_dir_for(source);
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            std::fs::create_dir_all(&dir)?;
            for height in &self.heights {
                std::fs::write(
                    dir.join(rendition_file_name(&stem, *height)),
                    format!("rendition-{}", height),
                )?;
            }
        }

        let code = self.code;
        Ok(EngineRun {
            stdout: stream::iter(self.stdout.clone()).boxed(),
            stderr: stream::iter(self.stderr.clone()).boxed(),
            exit: async move { Ok::<i32, JobError>(code) }.boxed(),
        })
    }
}

pub struct TestHarness {
    pub state: AppState,
    pub dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn new(engine: Arc<dyn TranscodeEngine>) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let config = AppConfig {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            upload_dir: dir.path().join("uploads"),
            engine_bin: "ladder-engine".to_string(),
            max_upload_bytes: 16 * 1024 * 1024,
        };
        std::fs::create_dir_all(&config.upload_dir).expect("failed to create upload dir");

        let state = AppState::new(config, Arc::new(InMemoryJobRegistry::new()), engine);
        Self { state, dir }
    }

    pub fn app(&self) -> Router {
        create_app(self.state.clone())
    }

    pub fn job_dir(&self, id: &str) -> PathBuf {
        self.state.config.upload_dir.join(id)
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let resp = self.app().oneshot(req).await.expect("request failed");
        let status = resp.status();
        let bytes = resp
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes();
        (status, bytes.to_vec())
    }

    pub async fn send_json(&self, req: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = self.send(req).await;
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send_json(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post(&self, uri: &str) -> (StatusCode, Value) {
        self.send_json(Request::post(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send_json(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn submit(&self, filename: &str, content_type: &str, data: &[u8]) -> (StatusCode, Value) {
        let req = Request::post("/api/v1/jobs")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body("video", filename, content_type, data)))
            .unwrap();
        self.send_json(req).await
    }

    /// Submits a small fake video and returns its job id.
    pub async fn submit_video(&self, filename: &str) -> String {
        let (status, json) = self.submit(filename, "video/mp4", b"fake video bytes").await;
        assert_eq!(status, StatusCode::CREATED, "submit failed: {json}");
        json["data"]["jobId"].as_str().unwrap().to_string()
    }

    /// Polls the job until it reaches a terminal state, recording every status seen.
    pub async fn wait_for_terminal(&self, id: &str) -> (Value, Vec<String>) {
        let mut seen = Vec::new();
        for _ in 0..400 {
            let (status, json) = self.get(&format!("/api/v1/jobs/{id}")).await;
            assert_eq!(status, StatusCode::OK);
            let job = json["data"].clone();
            let job_status = job["status"].as_str().unwrap().to_string();
            seen.push(job_status.clone());
            if job_status == "completed" || job_status == "failed" {
                return (job, seen);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {id} never reached a terminal state");
    }
}

pub fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}
