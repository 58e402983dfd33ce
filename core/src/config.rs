//! Construction-time configuration for `HttpClient`.
//!
//! # Design
//! Everything here is read once when the client is built and never changes
//! afterwards. The struct is serde-friendly so it can come from a JSON file,
//! and `from_env` covers the common "base URL from the environment" case.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::Classification;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingVar(String),

    #[error("invalid {key} {value:?}: {reason}")]
    InvalidVar {
        key: String,
        value: String,
        reason: String,
    },

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Prefix every endpoint is appended to. Usually ends with `/`.
    pub base_url: String,
    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub classification: Classification,
    /// Transport timeout in milliseconds, handed to executors that support
    /// one. Must be non-zero when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            default_headers: BTreeMap::new(),
            classification: Classification::default(),
            timeout_ms: None,
        }
    }

    /// Config that sends and accepts JSON by default.
    pub fn json_defaults(base_url: impl Into<String>) -> Self {
        Self::new(base_url)
            .with_default_header("Accept", "application/json")
            .with_default_header("Content-Type", "application/json")
    }

    pub fn with_default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = classification;
        self
    }

    /// Sets the transport timeout. Sub-millisecond durations round up to one
    /// millisecond; `Duration::ZERO` clears the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = if timeout.is_zero() {
            None
        } else {
            Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX).max(1))
        };
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        if config.timeout_ms == Some(0) {
            return Err(zero_timeout("timeout_ms".to_string()));
        }
        Ok(config)
    }

    /// Reads `{prefix}_BASE_URL` (required) and `{prefix}_TIMEOUT_MS`.
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(prefix, |key| std::env::var(key).ok())
    }

    fn from_lookup(
        prefix: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let key = format!("{prefix}_BASE_URL");
        let base_url = lookup(&key).ok_or(ConfigError::MissingVar(key))?;

        let mut config = Self::new(base_url);
        let key = format!("{prefix}_TIMEOUT_MS");
        if let Some(raw) = lookup(&key) {
            let ms = match raw.trim().parse::<u64>() {
                Ok(0) => return Err(zero_timeout(key)),
                Ok(ms) => ms,
                Err(e) => {
                    return Err(ConfigError::InvalidVar {
                        key,
                        value: raw.clone(),
                        reason: e.to_string(),
                    })
                }
            };
            config.timeout_ms = Some(ms);
        }
        Ok(config)
    }
}

fn zero_timeout(key: String) -> ConfigError {
    ConfigError::InvalidVar {
        key,
        value: "0".to_string(),
        reason: "timeout must be non-zero".to_string(),
    }
}
