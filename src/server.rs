// http surface - health check and the chat relay endpoint

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{Error, Relay, Role, Turn, Upstream};

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
}

pub struct Server;

impl Server {
    pub async fn run<U>(relay: Relay<U>, host: &str, port: u16) -> Result<(), Error>
    where
        U: Upstream + 'static,
    {
        let app = router(relay);

        let addr = format!("{host}:{port}");
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Server(format!("can't bind {addr}: {e}")))?;

        tracing::info!(%addr, "relay listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        Ok(())
    }
}

pub fn router<U>(relay: Relay<U>) -> Router
where
    U: Upstream + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/wellbeingChat", post(wellbeing_chat::<U>))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(relay))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

async fn wellbeing_chat<U: Upstream>(State(relay): State<Arc<Relay<U>>>, body: Bytes) -> Response {
    let history = match parse_history(&body) {
        Ok(h) => h,
        Err(e) => return e.into_response(),
    };

    match relay.handle(&history).await {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Reads `{ messages: [...] }` leniently. Anything that isn't a list of
/// turns becomes an empty history; only a non-json body is rejected.
pub fn parse_history(body: &[u8]) -> Result<Vec<Turn>, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_slice(body)?;

    let Some(messages) = value.get("messages").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    Ok(messages.iter().filter_map(decode_turn).collect())
}

fn decode_turn(value: &Value) -> Option<Turn> {
    let role = match value.get("role")?.as_str()? {
        "system" => Role::System,
        "user" => Role::User,
        "assistant" => Role::Assistant,
        _ => return None,
    };

    // non-text content is treated as empty, which never classifies as crisis
    let content = value
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default();

    Some(Turn::new(role, content))
}

fn handle_panic(_: Box<dyn Any + Send + 'static>) -> Response {
    Error::Internal("handler panicked".to_string()).into_response()
}
