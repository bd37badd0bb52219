#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use audit_report_service::{build_router, AppState, ServiceConfig};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub const ALLOWED_ORIGIN: &str = "https://app.example";

pub const REPORT_TEXT: &str = r#"const reportData = {
  client: "Acme",
  businessoverview: "A neighbourhood bakery.",
  instagramSummary: "Posts daily.",
  facebookSummary: "Rarely updated.",
  instagramScore: 78,
  facebookScore: 61,
  overallScore: 70,
  businesssummary: "Good foundations.",
  insights: ["Strong visuals", "Weak reviews"],
  tips: ["t1"]
};"#;

/// What the fake Gemini endpoint answers with.
#[derive(Clone)]
pub enum MockReply {
    Text(String),
    Status(u16),
    NotJson,
    Slow(Duration),
}

struct MockState {
    reply: MockReply,
    calls: Arc<AtomicUsize>,
}

pub struct MockGemini {
    pub addr: SocketAddr,
    pub calls: Arc<AtomicUsize>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockGemini {
    pub async fn spawn(reply: MockReply) -> Self {
        async fn generate(State(state): State<Arc<MockState>>) -> axum::response::Response {
            state.calls.fetch_add(1, Ordering::SeqCst);
            match &state.reply {
                MockReply::Text(text) => Json(candidate(text)).into_response(),
                MockReply::Status(code) => (
                    StatusCode::from_u16(*code).expect("valid status"),
                    Json(json!({ "error": { "message": "mock failure" } })),
                )
                    .into_response(),
                MockReply::NotJson => "<html>oops</html>".into_response(),
                MockReply::Slow(delay) => {
                    tokio::time::sleep(*delay).await;
                    Json(candidate(REPORT_TEXT)).into_response()
                }
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let state = Arc::new(MockState {
            reply,
            calls: calls.clone(),
        });
        let app = Router::new().fallback(generate).with_state(state);
        let (addr, shutdown) = serve(app).await;

        Self {
            addr,
            calls,
            shutdown: Some(shutdown),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/v1beta", self.addr)
    }
}

impl Drop for MockGemini {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub fn candidate(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

async fn serve(app: Router) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let addr = listener.local_addr().expect("local_addr should succeed");

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
    });

    (addr, shutdown_tx)
}

/// The real service, bound to an ephemeral port.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub log_path: PathBuf,
    _tmp: TempDir,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestApp {
    pub async fn spawn(base_url: Option<String>) -> Self {
        Self::spawn_with(base_url, |_| {}).await
    }

    pub async fn spawn_with(
        base_url: Option<String>,
        tweak: impl FnOnce(&mut ServiceConfig),
    ) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let log_path = tmp.path().join("user_data.json");

        let mut config = ServiceConfig {
            gemini_api_key: base_url.as_ref().map(|_| "test-key".to_string()),
            gemini_model: "gemini-test".to_string(),
            gemini_base_url: base_url.unwrap_or_default(),
            allowed_origins: vec![ALLOWED_ORIGIN.to_string()],
            submissions_log: log_path.clone(),
            upstream_timeout: Duration::from_secs(5),
            cookie_secure: false,
            ..ServiceConfig::default()
        };
        tweak(&mut config);

        let state = AppState::in_memory(config).expect("state should build");
        let (addr, shutdown) = serve(build_router(state)).await;

        Self {
            addr,
            client: reqwest::Client::new(),
            log_path,
            _tmp: tmp,
            shutdown: Some(shutdown),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn submit(&self, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/submit"))
            .json(&body)
            .send()
            .await
            .expect("request should reach the service")
    }

    pub fn logged_lines(&self) -> Vec<Value> {
        std::fs::read_to_string(&self.log_path)
            .unwrap_or_default()
            .lines()
            .map(|line| serde_json::from_str(line).expect("log line is JSON"))
            .collect()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub fn valid_submission() -> Value {
    json!({
        "url": "https://acme.example",
        "email": "hi@acme.example",
        "phone": "555-0100",
        "category": "Bakery"
    })
}

/// `name=value` part of a `Set-Cookie` header.
pub fn cookie_pair(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .expect("response should set a session cookie")
        .to_string()
}
