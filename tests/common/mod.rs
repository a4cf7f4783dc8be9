#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;

use search_agent::agent::{SearchAgent, Summarizer};
use search_agent::core::config::FetchSettings;
use search_agent::core::errors::AgentError;
use search_agent::llm::{ChatRequest, LlmProvider, ProviderModel};
use search_agent::tools::{ContentFetcher, SearchProvider, SearchResult};

pub const RUST_PAGE: &str = "<html><head><title>Rust</title><script>track()</script></head>\
    <body><h1>Rust</h1><p>Memory safety   without garbage collection.</p></body></html>";
pub const BOOK_PAGE: &str = "<html><body><article>The Rust Book teaches ownership.</article></body></html>";

/// Serves `/rust` and `/book` as HTML, `/missing` as 404, `/broken` as 500
/// and `/huge` as a body larger than any test byte cap.
pub async fn spawn_site() -> SocketAddr {
    let app = Router::new()
        .route("/rust", get(|| async { Html(RUST_PAGE) }))
        .route("/book", get(|| async { Html(BOOK_PAGE) }))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "should never be read") }),
        )
        .route("/huge", get(|| async { Html("x".repeat(64 * 1024)) }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    addr
}

pub fn local_fetch_settings() -> FetchSettings {
    FetchSettings {
        block_private_hosts: false,
        max_bytes: 16 * 1024,
        ..FetchSettings::default()
    }
}

pub fn hit(title: &str, link: &str) -> SearchResult {
    SearchResult::from_parts(title, link, "snippet").expect("valid hit")
}

/// Returns a fixed list (ignoring `max_results`) or a fixed error.
pub struct FakeSearch {
    results: Vec<SearchResult>,
    fail: bool,
    pub calls: AtomicUsize,
}

impl FakeSearch {
    pub fn returning(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            results: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    fn name(&self) -> &str {
        "fake"
    }

    async fn search(
        &self,
        _query: &str,
        _max_results: usize,
    ) -> Result<Vec<SearchResult>, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AgentError::Provider("search backend unavailable".to_string()));
        }
        Ok(self.results.clone())
    }
}

/// Records every prompt; replies "summary #N" or fails when `fail` is set.
pub struct RecordingLlm {
    pub prompts: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingLlm {
    pub fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("lock").clone()
    }
}

#[async_trait]
impl LlmProvider for RecordingLlm {
    fn name(&self) -> &str {
        "recording"
    }

    async fn health_check(&self) -> Result<bool, AgentError> {
        Ok(true)
    }

    async fn list_models(&self) -> Result<Vec<ProviderModel>, AgentError> {
        Ok(Vec::new())
    }

    async fn chat(&self, request: ChatRequest, _model_id: &str) -> Result<String, AgentError> {
        let prompt = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let mut prompts = self.prompts.lock().expect("lock");
        prompts.push(prompt);
        if self.fail {
            return Err(AgentError::Generation("model crashed".to_string()));
        }
        Ok(format!("summary #{}", prompts.len()))
    }
}

pub fn build_agent(search: Arc<FakeSearch>, llm: Arc<RecordingLlm>, max_results: usize) -> SearchAgent {
    let fetcher = ContentFetcher::new(local_fetch_settings()).expect("fetcher");
    let summarizer = Summarizer::new(llm, "test-model", 0.3);
    SearchAgent::new(search, fetcher, summarizer, max_results)
}
