// upstream chat-completion client (openai-compatible)

use crate::Error;
use crate::core::context::Turn;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const MAX_ERROR_DETAIL_CHARS: usize = 500;

pub const EMPTY_REPLY: &str = "Lo siento, no pude generar una respuesta en este momento. \
¿Podrías intentarlo de nuevo?";

/// One chat completion per call. Implementations never retry.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn complete(&self, payload: &[Turn]) -> Result<String, Error>;
}

#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub struct OpenAi {
    client: reqwest::Client,
    api_key: Option<String>,
    settings: UpstreamSettings,
}

// what we send
#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [Turn],
}

// what comes back, every level optional
#[derive(Deserialize)]
struct Response {
    choices: Option<Vec<Choice>>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAi {
    pub fn new(api_key: Option<String>, settings: UpstreamSettings) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;

        // blank keys count as missing
        let api_key = api_key.filter(|k| !k.trim().is_empty());

        Ok(Self {
            client,
            api_key,
            settings,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Upstream for OpenAi {
    async fn complete(&self, payload: &[Turn]) -> Result<String, Error> {
        let api_key = self.api_key.as_deref().ok_or(Error::MissingApiKey)?;

        let request = Request {
            model: &self.settings.model,
            temperature: self.settings.temperature,
            messages: payload,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| upstream_error(None, &e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| upstream_error(Some(status.as_u16()), &e.to_string()))?;

        if !status.is_success() {
            return Err(upstream_error(Some(status.as_u16()), &body));
        }

        let parsed: Response = serde_json::from_str(&body).map_err(|e| {
            upstream_error(
                Some(status.as_u16()),
                &format!("unreadable completion body: {e}"),
            )
        })?;

        let reply = parsed
            .choices
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        if reply.is_empty() {
            tracing::warn!("upstream returned no reply text");
            return Ok(EMPTY_REPLY.to_string());
        }

        Ok(reply)
    }
}

fn upstream_error(status: Option<u16>, details: &str) -> Error {
    Error::Upstream {
        status,
        details: prefix_chars(details, MAX_ERROR_DETAIL_CHARS).to_string(),
    }
}

/// At most `max_chars` characters of `s`, cut on a char boundary.
pub fn prefix_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
