//! Client configuration.
//!
//! The base URL is resolved once, when the client is constructed, and
//! prefixed to every request path afterwards.

use tracing::info;

use crate::error::ConfigError;

/// Environment variable selecting the backend base URL.
pub const BASE_URL_ENV: &str = "API_BASE_URL";

/// Base URL used when `API_BASE_URL` is unset or empty.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    base_url: String,
}

impl Config {
    /// Validate `base_url` and strip trailing slashes.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::UnsupportedScheme(trimmed.to_string()));
        }
        Ok(Self {
            base_url: trimmed.to_string(),
        })
    }

    /// Read `API_BASE_URL` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup. An unset
    /// or blank variable falls back to `DEFAULT_BASE_URL`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(BASE_URL_ENV).filter(|value| !value.trim().is_empty()) {
            Some(value) => Self::new(value),
            None => {
                info!("{BASE_URL_ENV} not set, using default: {DEFAULT_BASE_URL}");
                Self::new(DEFAULT_BASE_URL)
            }
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}
