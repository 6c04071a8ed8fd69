//! Client configuration.
//!
//! Everything an `AccountsClient` needs is fixed at construction time; there
//! is no global state. `ClientConfig::from_env` lets a deployment override
//! the endpoint and retry budget without code changes.

use std::time::Duration;

use thiserror::Error;

use crate::retry::{Backoff, RetryPolicy, DEFAULT_MAX_RETRIES};

/// Default endpoint of the accounts service.
pub const DEFAULT_BASE_URL: &str = "http://accountapi:8080/v1/organisation/accounts";

pub const BASE_URL_ENV: &str = "ACCOUNTS_API_URL";
pub const MAX_RETRIES_ENV: &str = "ACCOUNTS_API_MAX_RETRIES";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ACCOUNTS_API_URL is set but empty")]
    EmptyBaseUrl,

    #[error("ACCOUNTS_API_MAX_RETRIES must be a non-negative integer, got {0:?}")]
    InvalidMaxRetries(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Collection URL, e.g. `http://accountapi:8080/v1/organisation/accounts`.
    /// Stored without a trailing slash.
    pub base_url: String,
    pub max_retries: u32,
    pub backoff: Backoff,
    /// Per-request timeout; `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Backoff::None,
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self::default().with_base_url(base_url)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Unset keys keep their
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(BASE_URL_ENV) {
            let url = url.trim();
            if url.is_empty() {
                return Err(ConfigError::EmptyBaseUrl);
            }
            config = config.with_base_url(url);
        }

        if let Some(raw) = lookup(MAX_RETRIES_ENV) {
            let retries = raw
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidMaxRetries(raw.clone()))?;
            config.max_retries = retries;
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff: self.backoff,
        }
    }
}
