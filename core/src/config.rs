//! Client configuration.
//!
//! A `ClientConfig` is built once and never mutated; the client shares it
//! behind an `Arc` with every call.

use std::fmt;

use thiserror::Error;

use crate::auth::BasicAuth;

/// Production endpoint of the Vendus API.
pub const DEFAULT_BASE_URL: &str = "https://www.vendus.pt/ws/v1.1";

pub const API_KEY_ENV: &str = "VENDUS_API_KEY";
pub const BASE_URL_ENV: &str = "VENDUS_BASE_URL";

/// Errors raised while loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing API key: set VENDUS_API_KEY")]
    MissingApiKey,
}

/// Immutable credentials and endpoint for one client instance.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
}

impl ClientConfig {
    /// Configuration against the production API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Replaces the base URL. A trailing `/` is dropped.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Reads `VENDUS_API_KEY` and, optionally, `VENDUS_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        let config = Self::new(api_key);
        Ok(match lookup(BASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            Some(url) => config.with_base_url(url.trim()),
            None => config,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> BasicAuth {
        BasicAuth::new(self.api_key.clone())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}
