//! Shared harness: router over a temp history file and an in-memory backend.

#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use api::{AppConfig, AppState, router};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use completion_service::{CompletionBackend, CompletionConfig, CompletionError};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

type Reply = Box<dyn Fn() -> Result<String, CompletionError> + Send + Sync>;

/// Backend that records every call and answers with a canned reply.
pub struct FakeBackend {
    reply: Reply,
    calls: Mutex<Vec<(Instant, String)>>,
}

impl FakeBackend {
    pub fn answering(text: &'static str) -> Arc<Self> {
        Self::with_reply(move || Ok(text.to_string()))
    }

    pub fn failing(make: impl Fn() -> CompletionError + Send + Sync + 'static) -> Arc<Self> {
        Self::with_reply(move || Err(make()))
    }

    pub fn panicking() -> Arc<Self> {
        Self::with_reply(|| panic!("backend exploded"))
    }

    fn with_reply(
        reply: impl Fn() -> Result<String, CompletionError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    pub fn questions(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, q)| q.clone()).collect()
    }
}

#[async_trait]
impl CompletionBackend for FakeBackend {
    async fn complete(&self, question: &str) -> Result<String, CompletionError> {
        self.calls
            .lock()
            .unwrap()
            .push((Instant::now(), question.to_string()));
        (self.reply)()
    }

    fn model(&self) -> &str {
        "fake/model"
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub backend: Option<Arc<FakeBackend>>,
    pub history_file: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    /// App with a configured credential and `backend`, no throttling.
    pub fn with_backend(backend: Arc<FakeBackend>) -> Self {
        Self::build(Some(backend), Duration::ZERO, None)
    }

    /// App without a credential.
    pub fn unconfigured() -> Self {
        Self::build(None, Duration::ZERO, None)
    }

    pub fn build(
        backend: Option<Arc<FakeBackend>>,
        min_interval: Duration,
        history_override: Option<PathBuf>,
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let history_file = history_override.unwrap_or_else(|| dir.path().join("search_history.txt"));

        let config = AppConfig {
            history_file: history_file.clone(),
            min_interval,
            completion: CompletionConfig {
                api_key: backend.as_ref().map(|_| "sk-or-test-secret".to_string()),
                ..CompletionConfig::default()
            },
            ..AppConfig::default()
        };

        let dyn_backend = backend
            .clone()
            .map(|b| b as Arc<dyn CompletionBackend>);
        let state = Arc::new(AppState::with_backend(config, dyn_backend));

        Self {
            router: router(state.clone()),
            state,
            backend,
            history_file,
            _dir: dir,
        }
    }

    pub fn calls(&self) -> usize {
        self.backend.as_ref().map_or(0, |b| b.call_count())
    }

    pub fn history(&self) -> String {
        std::fs::read_to_string(&self.history_file).unwrap_or_default()
    }

    /// POSTs a raw JSON body to `/ask`.
    pub async fn ask_raw(&self, body: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .uri("/ask")
            .method(Method::POST)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }

    pub async fn ask(&self, question: &str) -> (StatusCode, Value) {
        let body = serde_json::json!({ "question": question }).to_string();
        self.ask_raw(&body).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let req = Request::builder()
            .uri(uri)
            .method(Method::GET)
            .body(Body::empty())
            .unwrap();
        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}
