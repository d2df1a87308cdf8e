//! Client configuration: base URL, request pacing, and retry policy.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("API base URL must be an http(s) URL: {0}")]
    BadBaseUrl(String),
    #[error("request timeout must be positive")]
    BadTimeout,
    #[error("backoff factor must be at least 1.0")]
    BadBackoff,
}

/// Configuration for the Federal Register API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL without a trailing slash, e.g. `https://www.federalregister.gov/api/v1`.
    pub base_url: String,
    /// Maximum requests per second; zero or negative disables pacing.
    pub rate_limit: f64,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Backoff-driven retries after the first attempt.
    pub max_retries: u32,
    /// Backoff sleep is `backoff_factor ** attempt` seconds.
    pub backoff_factor: f64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.federalregister.gov/api/v1".to_string(),
            rate_limit: 1.0,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            backoff_factor: 2.0,
            user_agent: format!("regtally/{} (research tool)", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Check the configuration for values the client cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::BadBaseUrl(self.base_url.clone()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::BadTimeout);
        }
        if self.backoff_factor < 1.0 {
            return Err(ConfigError::BadBackoff);
        }
        Ok(())
    }
}
