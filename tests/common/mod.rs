// shared test doubles

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Json, Router, http::StatusCode, routing::post};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use wellbeing_relay::{Error, Turn, Upstream};

/// Upstream double that counts calls and records the last payload.
#[derive(Clone, Default)]
pub struct CountingUpstream {
    calls: Arc<AtomicUsize>,
    last_payload: Arc<Mutex<Vec<Turn>>>,
    // failures handed out before the first success
    failures: Arc<Mutex<Vec<Error>>>,
    reply: Option<String>,
}

impl CountingUpstream {
    pub fn failing_with(errors: Vec<Error>) -> Self {
        Self {
            failures: Arc::new(Mutex::new(errors)),
            ..Self::default()
        }
    }

    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_payload(&self) -> Vec<Turn> {
        self.last_payload.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for CountingUpstream {
    async fn complete(&self, payload: &[Turn]) -> Result<String, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap() = payload.to_vec();

        let mut failures = self.failures.lock().unwrap();
        if !failures.is_empty() {
            return Err(failures.remove(0));
        }

        Ok(self
            .reply
            .clone()
            .unwrap_or_else(|| "¡Qué bien! Una ensalada es una gran elección.".to_string()))
    }
}

/// Upstream double that panics mid-request.
pub struct PanickingUpstream;

#[async_trait]
impl Upstream for PanickingUpstream {
    async fn complete(&self, _payload: &[Turn]) -> Result<String, Error> {
        panic!("boom");
    }
}

pub fn upstream_status(code: u16) -> Error {
    Error::Upstream {
        status: Some(code),
        details: format!("status {code}"),
    }
}

/// Starts a fake chat-completions provider that always answers with
/// `status` and `body`. Returns its base url and a request counter.
pub async fn fake_provider(
    status: StatusCode,
    body: serde_json::Value,
) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let app = Router::new().route(
        "/v1/chat/completions",
        post(move |Json(_req): Json<serde_json::Value>| {
            let counter = counter.clone();
            let body = body.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (status, Json(body))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/v1"), hits)
}

/// Fake provider that waits `delay` before answering 200.
pub async fn slow_provider(delay: Duration) -> String {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move || async move {
            tokio::time::sleep(delay).await;
            Json(serde_json::json!({ "choices": [{ "message": { "content": "tarde" } }] }))
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/v1")
}
