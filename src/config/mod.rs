//! Process configuration, built once at startup and passed explicitly.
//!
//! Credentials are never defaulted: a missing or blank key fails closed
//! with [`ConfigurationError::Missing`]. Everything else has a default in
//! [`Settings`].

use std::fmt;
use std::time::Duration;

use reqwest::Url;

use crate::consts::{
    DEFAULT_GEMINI_BASE_URL, DEFAULT_MODEL, DEFAULT_PROJECT, DEFAULT_TRACE_ENDPOINT,
    DEFAULT_TRACE_TIMEOUT, MODEL_KEY_VAR, TRACING_KEY_VAR,
};
use crate::error::ConfigurationError;

/// Non-secret settings, usually filled from CLI flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub model: String,
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub trace_endpoint: String,
    /// Upper bound on one run upload.
    pub trace_timeout: Duration,
    pub project: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: None,
            trace_endpoint: DEFAULT_TRACE_ENDPOINT.to_string(),
            trace_timeout: DEFAULT_TRACE_TIMEOUT,
            project: DEFAULT_PROJECT.to_string(),
        }
    }
}

/// Where and how to reach the text-generation service.
#[derive(Clone)]
pub struct ModelConfig {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

/// Where runs are recorded.
#[derive(Clone)]
pub struct TracingConfig {
    pub api_key: String,
    pub endpoint: String,
    pub project: String,
    pub timeout: Duration,
}

/// Complete, validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub model: ModelConfig,
    pub tracing: TracingConfig,
}

impl Config {
    /// Read credentials from the process environment.
    pub fn from_env(settings: Settings) -> Result<Self, ConfigurationError> {
        Self::load(settings, |name| std::env::var(name).ok())
    }

    /// Build a config from `settings`, resolving credentials through `lookup`.
    pub fn load<F>(settings: Settings, lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let model_key = require(&lookup, MODEL_KEY_VAR)?;
        let tracing_key = require(&lookup, TRACING_KEY_VAR)?;

        if settings.model.trim().is_empty() {
            return Err(ConfigurationError::Invalid {
                name: "model",
                reason: "model id is empty".to_string(),
            });
        }
        let base_url = validate_url("base URL", &settings.base_url)?;
        let endpoint = validate_url("trace endpoint", &settings.trace_endpoint)?;

        Ok(Self {
            model: ModelConfig {
                model: settings.model,
                api_key: model_key,
                base_url,
                timeout: settings.timeout,
            },
            tracing: TracingConfig {
                api_key: tracing_key,
                endpoint,
                project: settings.project,
                timeout: settings.trace_timeout,
            },
        })
    }
}

fn require<F>(lookup: &F, name: &'static str) -> Result<String, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigurationError::Missing(name)),
    }
}

/// Parse as an http(s) URL and strip any trailing slash.
fn validate_url(name: &'static str, raw: &str) -> Result<String, ConfigurationError> {
    let url = Url::parse(raw).map_err(|e| ConfigurationError::Invalid {
        name,
        reason: format!("{raw}: {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigurationError::Invalid {
            name,
            reason: format!("{raw}: unsupported scheme {}", url.scheme()),
        });
    }
    Ok(raw.trim_end_matches('/').to_string())
}

// Keys stay out of logs and panics.
impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl fmt::Debug for TracingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("project", &self.project)
            .field("timeout", &self.timeout)
            .finish()
    }
}
