//! Configuration Module
//!
//! Handles loading and validating the store configuration, either from
//! environment variables or from a deserialized argument object.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, StoreError};

/// Default GraphQL endpoint.
pub const DEFAULT_URI: &str = "http://localhost:3001/v1/graphql";

/// Default TTL in milliseconds.
pub const DEFAULT_TTL_MS: u64 = 60 * 1000;

/// Default per-request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30 * 1000;

/// Store configuration parameters.
///
/// Captured once at construction; the store never mutates it afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// GraphQL endpoint URL
    pub uri: String,
    /// Store options
    pub options: StoreOptions,
}

/// Tunables nested under `options`.
///
/// `secret` and `headers` are applied by the built-in reqwest client only; a
/// store built with a custom executor leaves them to that executor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Default TTL in milliseconds for writes without an explicit TTL
    pub ttl: u64,
    /// Admin secret sent as `x-hasura-admin-secret`
    pub secret: Option<String>,
    /// Allows writes to request the compressed storage path
    pub compression: bool,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Extra headers attached to every request
    pub headers: HashMap<String, String>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL_MS,
            secret: None,
            compression: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            headers: HashMap::new(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            options: StoreOptions::default(),
        }
    }
}

impl StoreConfig {
    /// Creates a config for `uri` with default options.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Creates a new StoreConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `HASURA_GRAPHQL_API_ENDPOINT` - Endpoint URL (default: `http://localhost:3001/v1/graphql`)
    /// - `HASURA_GRAPHQL_ADMIN_SECRET` - Admin secret (default: unset)
    /// - `CACHE_TTL_MS` - Default TTL in milliseconds (default: 60000)
    /// - `CACHE_COMPRESSION` - Enable compressed writes (default: false)
    /// - `CACHE_REQUEST_TIMEOUT_MS` - Request timeout in milliseconds (default: 30000)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = StoreOptions::default();
        Self {
            uri: lookup("HASURA_GRAPHQL_API_ENDPOINT").unwrap_or_else(|| DEFAULT_URI.to_string()),
            options: StoreOptions {
                ttl: lookup("CACHE_TTL_MS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.ttl),
                secret: lookup("HASURA_GRAPHQL_ADMIN_SECRET").filter(|s| !s.is_empty()),
                compression: lookup("CACHE_COMPRESSION")
                    .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                    .unwrap_or(defaults.compression),
                timeout_ms: lookup("CACHE_REQUEST_TIMEOUT_MS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.timeout_ms),
                headers: HashMap::new(),
            },
        }
    }

    /// Sets the default TTL, rounding sub-millisecond remainders up.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        let mut millis = ttl.as_millis();
        if ttl.subsec_nanos() % 1_000_000 != 0 {
            millis += 1;
        }
        self.options.ttl = u64::try_from(millis).unwrap_or(u64::MAX);
        self
    }

    /// Sets the admin secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.options.secret = Some(secret.into());
        self
    }

    /// Enables or disables the compressed write path.
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.options.compression = enabled;
        self
    }

    /// Adds a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.headers.insert(name.into(), value.into());
        self
    }

    /// Default TTL as a duration.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.options.ttl)
    }

    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.options.timeout_ms)
    }

    /// Rejects configurations the store cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.options.ttl == 0 {
            return Err(StoreError::Configuration(
                "default ttl must be a positive number of milliseconds".to_string(),
            ));
        }
        if self.options.timeout_ms == 0 {
            return Err(StoreError::Configuration(
                "request timeout must be positive".to_string(),
            ));
        }

        let url = reqwest::Url::parse(&self.uri).map_err(|e| {
            StoreError::Configuration(format!("invalid endpoint '{}': {}", self.uri, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(StoreError::Configuration(format!(
                "endpoint must use http or https, got '{}'",
                url.scheme()
            )));
        }

        Ok(())
    }
}
