//! Client configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Origin the relative API paths are joined onto.
    pub base_url: String,
    /// Whole-request timeout. `None` leaves requests untimed.
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl ClientConfig {
    /// Config for `base_url` with no timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            request_timeout: None,
            connect_timeout: None,
        }
    }

    /// Replace the API origin, normalized the same way as [`ClientConfig::new`].
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Self::new(base_url).base_url;
        self
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `AUTH_API_BASE_URL`: default `http://127.0.0.1:3000`
    /// - `AUTH_REQUEST_TIMEOUT_SECS`: unset means no timeout
    /// - `AUTH_CONNECT_TIMEOUT_SECS`: unset means no timeout
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a timeout is not a whole
    /// number of seconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("AUTH_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned());
        let mut config = Self::new(base_url);
        config.request_timeout = env_secs("AUTH_REQUEST_TIMEOUT_SECS")?;
        config.connect_timeout = env_secs("AUTH_CONNECT_TIMEOUT_SECS")?;
        Ok(config)
    }
}

fn env_secs(var: &'static str) -> Result<Option<Duration>, ConfigError> {
    let Ok(raw) = std::env::var(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<u64>()
        .map(|secs| Some(Duration::from_secs(secs)))
        .map_err(|_| ConfigError::InvalidValue { var, value: raw })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
