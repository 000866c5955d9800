//! Store Module
//!
//! The cache-backend contract a caching layer programs against, and its
//! GraphQL-backed implementation.

mod hasura;
pub mod queries;

use std::time::Duration;

use async_trait::async_trait;

use crate::cache::{CacheRecord, CacheValue};
use crate::error::Result;

pub use hasura::HasuraStore;

/// Per-write options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Overrides the store's default TTL
    pub ttl: Option<Duration>,
    /// Requests the compressed path; honored only when the store enables compression
    pub compress: bool,
}

impl SetOptions {
    pub fn ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    pub fn compressed(mut self) -> Self {
        self.compress = true;
        self
    }
}

/// Storage driver contract used by a caching layer.
///
/// Patterns are globs; `None`, `""` and `"*"` match every key.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Store identifier.
    fn name(&self) -> &str;

    /// Returns the live value for `key`, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<CacheValue>>;

    /// Writes `value` under `key`, replacing any previous record.
    async fn set(&self, key: &str, value: CacheValue, options: SetOptions) -> Result<CacheRecord>;

    /// Removes `key`; true iff a row was removed.
    async fn del(&self, key: &str) -> Result<bool>;

    /// Lists live keys matching `pattern`, in backend order.
    async fn keys(&self, pattern: Option<&str>) -> Result<Vec<String>>;

    /// Removes every key matching `pattern`.
    async fn reset(&self, pattern: Option<&str>) -> Result<bool>;
}
