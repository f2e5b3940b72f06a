// command line interface - every flag can also come from the environment

use crate::{
    ContextAssembler, CrisisDetector, DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAi, Relay, RetryPolicy,
    Server, UpstreamSettings,
};
use clap::Parser;
use miette::Result;
use std::path::PathBuf;
use std::time::Duration;

const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

#[derive(Parser, Debug)]
#[command(
    name = "wellbeing-relay",
    about = "Crisis-aware relay between the wellbeing chat and an LLM API"
)]
pub struct Config {
    /// port number
    #[arg(long, short, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// host to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// api key for the upstream model provider (checked per request)
    #[arg(long, short = 'k', env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// chat model identifier
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// base url of the chat-completions api
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// sampling temperature (0-2)
    #[arg(long, env = "RELAY_TEMPERATURE", default_value = "0.7")]
    pub temperature: f32,

    /// upstream request timeout in seconds
    #[arg(long, env = "RELAY_TIMEOUT_SECS", default_value = "30")]
    pub timeout_secs: u64,

    /// max turns sent upstream, system preamble included
    #[arg(long, env = "RELAY_MAX_TURNS", default_value = "21")]
    pub max_turns: usize,

    /// extra upstream attempts on transport errors, 429 and 5xx
    #[arg(long, env = "RELAY_RETRIES", default_value = "0")]
    pub retries: u32,

    /// json file mapping crisis phrases to categories
    #[arg(long, env = "RELAY_PHRASES")]
    pub phrases: Option<PathBuf>,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.max_turns == 0 {
            return Err(miette::miette!("--max-turns must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(miette::miette!(
                "--temperature must be between 0 and 2, got {}",
                self.temperature
            ));
        }
        if self.timeout_secs == 0 {
            return Err(miette::miette!("--timeout-secs must be at least 1"));
        }
        Ok(())
    }

    pub fn upstream_settings(&self) -> UpstreamSettings {
        UpstreamSettings {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn detector(&self) -> Result<CrisisDetector> {
        match &self.phrases {
            Some(path) => Ok(CrisisDetector::from_file(path)?),
            None => Ok(CrisisDetector::default()),
        }
    }

    pub fn relay(&self) -> Result<Relay<OpenAi>> {
        let detector = self.detector()?;
        let upstream = OpenAi::new(self.api_key.clone(), self.upstream_settings())?;

        if !upstream.has_api_key() {
            // not fatal, each chat request reports it
            tracing::warn!("OPENAI_API_KEY is not set, chat requests will fail");
        }

        tracing::info!(
            phrases = detector.len(),
            max_turns = self.max_turns,
            model = %self.model,
            retries = self.retries,
            "relay configured"
        );

        Ok(
            Relay::new(detector, ContextAssembler::new(self.max_turns), upstream)
                .with_retry(RetryPolicy::new(self.retries, RETRY_BASE_DELAY)),
        )
    }
}

pub async fn run() -> Result<()> {
    let config = Config::parse();
    crate::logging::init();

    config.validate()?;
    let relay = config.relay()?;

    Ok(Server::run(relay, &config.host, config.port).await?)
}
