// request orchestration: classify, then either the safety reply or the model

use crate::Error;
use crate::core::ai::Upstream;
use crate::core::context::{ContextAssembler, Turn, last_user_content};
use crate::core::crisis::{CrisisCategory, CrisisDetector};
use serde::Serialize;
use std::time::Duration;

pub const SAFETY_MESSAGE: &str = "Siento mucho que estés pasando por un momento tan difícil. \
No estás solo y tu vida importa. Si estás en peligro inmediato, llama ahora al número de \
emergencias de tu país (911 en muchos países de Latinoamérica, 112 en España). También puedes \
acudir al servicio de urgencias más cercano o contactar a una línea de prevención del suicidio. \
Habla con alguien de confianza y pídele que te acompañe.";

/// `crisis` is true exactly when `reply` is the safety message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayResponse {
    reply: String,
    crisis: bool,
}

impl RelayResponse {
    pub fn safety() -> Self {
        Self {
            reply: SAFETY_MESSAGE.to_string(),
            crisis: true,
        }
    }

    /// A model reply identical to the safety text is reported as one.
    pub fn model(reply: String) -> Self {
        if reply == SAFETY_MESSAGE {
            return Self::safety();
        }

        Self {
            reply,
            crisis: false,
        }
    }

    pub fn reply(&self) -> &str {
        &self.reply
    }

    pub fn crisis(&self) -> bool {
        self.crisis
    }
}

/// Terminal state of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    SafetyReplied(CrisisCategory),
    Replied,
    Failed,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::SafetyReplied(_) => "safety_replied",
            Self::Replied => "replied",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, base_delay: Duration) -> Self {
        Self {
            retries,
            base_delay,
        }
    }

    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    fn delay(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

pub struct Relay<U> {
    detector: CrisisDetector,
    assembler: ContextAssembler,
    upstream: U,
    retry: RetryPolicy,
}

impl<U: Upstream> Relay<U> {
    pub fn new(detector: CrisisDetector, assembler: ContextAssembler, upstream: U) -> Self {
        Self {
            detector,
            assembler,
            upstream,
            retry: RetryPolicy::none(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Runs one request to a terminal state. History is caller-owned;
    /// nothing is kept between calls.
    pub async fn handle(&self, history: &[Turn]) -> Result<RelayResponse, Error> {
        let (result, outcome) = match self.screen(history) {
            Some(category) => (Ok(RelayResponse::safety()), Outcome::SafetyReplied(category)),
            None => match self.query(history).await {
                Ok(reply) => (Ok(RelayResponse::model(reply)), Outcome::Replied),
                Err(e) => (Err(e), Outcome::Failed),
            },
        };

        match outcome {
            Outcome::SafetyReplied(category) => tracing::info!(
                outcome = outcome.as_str(),
                category = category.as_str(),
                turns = history.len(),
                "crisis indicator matched, upstream skipped"
            ),
            _ => tracing::info!(
                outcome = outcome.as_str(),
                turns = history.len(),
                "chat request finished"
            ),
        }

        result
    }

    /// Crisis category of the latest user turn, if it has one.
    pub fn screen(&self, history: &[Turn]) -> Option<CrisisCategory> {
        last_user_content(history).and_then(|content| self.detector.detect(content))
    }

    async fn query(&self, history: &[Turn]) -> Result<String, Error> {
        let payload = self.assembler.build_upstream_payload(history);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.upstream.complete(&payload).await {
                Ok(reply) => return Ok(reply),
                Err(e) if attempt <= self.retry.retries && e.is_retryable() => {
                    let delay = self.retry.delay(attempt);
                    tracing::warn!(attempt, ?delay, error = %e, "upstream call failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
