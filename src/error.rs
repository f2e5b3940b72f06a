use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Missing OPENAI_API_KEY")]
    #[diagnostic(help("set OPENAI_API_KEY or pass --api-key"))]
    MissingApiKey,

    #[error("Upstream error: {details}")]
    Upstream {
        // none when the request never got a response
        status: Option<u16>,
        details: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Transport failures, 429 and 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Upstream { status: None, .. } => true,
            Error::Upstream {
                status: Some(code), ..
            } => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            Error::MissingApiKey => {
                tracing::error!("upstream credential is not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Missing OPENAI_API_KEY".to_string(),
                    None,
                )
            }
            Error::Upstream { status, details } => {
                tracing::error!(upstream_status = ?status, "upstream model request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Upstream model request failed".to_string(),
                    Some(details),
                )
            }
            Error::Json(e) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid JSON body: {e}"),
                None,
            ),
            other => {
                // keep internals out of the response
                tracing::error!(error = %other, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}
