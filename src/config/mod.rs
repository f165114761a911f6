//! Harness configuration, read from the environment (and an optional `.env`).

pub mod provider;

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::memory::summarization::DEFAULT_SUMMARIZE_THRESHOLD;
use crate::memory::working_memory::DEFAULT_LOG_CAPACITY;

pub use provider::LLMProvider;

const DEFAULT_TEMPERATURE: f64 = 0.5;
const DEFAULT_MAX_TURNS: usize = 20;

/// Settings for session memory and the turn loop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryConfig {
    /// Number of recent steps kept in the interaction log
    pub capacity: usize,
    /// Responses longer than this many characters get auto-summarized
    pub summarize_threshold: usize,
    /// Optional limit on each delegated agent call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_timeout_secs: Option<u64>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_LOG_CAPACITY,
            summarize_threshold: DEFAULT_SUMMARIZE_THRESHOLD,
            call_timeout_secs: None,
        }
    }
}

impl MemoryConfig {
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.map(Duration::from_secs)
    }
}

/// Everything needed to build an agent runner and a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarnessConfig {
    pub provider: LLMProvider,
    pub model: String,

    /// Optional custom base URL (e.g., for Ollama: http://localhost:11434)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    pub temperature: f64,
    /// Maximum number of tool-calling iterations per agent run
    pub max_turns: usize,

    #[serde(default)]
    pub memory: MemoryConfig,
}

impl HarnessConfig {
    /// Load configuration from `EARTHAGENT_*` environment variables,
    /// reading a `.env` file first if one exists.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider = match lookup("EARTHAGENT_PROVIDER") {
            Some(value) => value.parse()?,
            None => LLMProvider::default(),
        };

        let model = match lookup("EARTHAGENT_MODEL") {
            Some(model) => model,
            None => provider
                .default_model()
                .map(str::to_string)
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "EARTHAGENT_MODEL must be set for provider: {}",
                        provider
                    )
                })?,
        };

        let defaults = MemoryConfig::default();
        let memory = MemoryConfig {
            capacity: parse_or(&lookup, "EARTHAGENT_MEMORY_CAPACITY", defaults.capacity)?,
            summarize_threshold: parse_or(
                &lookup,
                "EARTHAGENT_SUMMARIZE_THRESHOLD",
                defaults.summarize_threshold,
            )?,
            call_timeout_secs: lookup("EARTHAGENT_CALL_TIMEOUT_SECS")
                .map(|value| {
                    value
                        .parse()
                        .context("Invalid EARTHAGENT_CALL_TIMEOUT_SECS")
                })
                .transpose()?,
        };

        Ok(Self {
            provider,
            model,
            api_base_url: lookup("EARTHAGENT_BASE_URL"),
            temperature: parse_or(&lookup, "EARTHAGENT_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            max_turns: parse_or(&lookup, "EARTHAGENT_MAX_TURNS", DEFAULT_MAX_TURNS)?,
            memory,
        })
    }

    /// Load the API key for the configured provider.
    /// Returns an empty string for providers that need none.
    pub fn api_key(&self) -> Result<String> {
        match self.provider.api_key_env() {
            Some(var) if self.provider.needs_api_key() => std::env::var(var).with_context(|| {
                format!("API key not found for provider {}: set {}", self.provider, var)
            }),
            _ => Ok(String::new()),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {}", key, value)),
        None => Ok(default),
    }
}
