//! Hasura Store
//!
//! Cache semantics over the remote `cache` table: expiry-aware reads, pattern
//! enumeration and the combined purge-then-upsert write.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::queries::{CACHE_DEL, CACHE_GET, CACHE_KEYS, CACHE_RESET, CACHE_SET};
use super::{CacheBackend, SetOptions};
use crate::cache::{
    format_timestamp, CacheRecord, CacheValue, Clock, ExpirationPolicy, KeyPattern, SystemClock,
    ValueCodec, TABLE,
};
use crate::client::{GraphqlClient, QueryExecutor};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};

/// Store identifier reported to the caching layer.
pub const STORE_NAME: &str = "hasura";

// == Hasura Store ==
/// Cache backend persisting records through a GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct HasuraStore<E = GraphqlClient> {
    executor: E,
    config: StoreConfig,
    policy: ExpirationPolicy,
    codec: ValueCodec,
    clock: Arc<dyn Clock>,
    headers: HashMap<String, String>,
}

impl HasuraStore<GraphqlClient> {
    // == Constructor ==
    /// Validates `config` and connects a reqwest-backed executor to its endpoint.
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let executor = GraphqlClient::new(&config)?;
        Self::with_executor(config, executor)
    }

    /// Builds a store from `HASURA_GRAPHQL_*` / `CACHE_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(StoreConfig::from_env())
    }
}

impl<E: QueryExecutor> HasuraStore<E> {
    /// Uses a caller-provided executor, e.g. one with its own transport stack.
    ///
    /// `options.secret` and `options.headers` are not applied here; the
    /// executor is expected to attach its own authorization headers.
    pub fn with_executor(config: StoreConfig, executor: E) -> Result<Self> {
        config.validate()?;
        if config.options.secret.is_some() || !config.options.headers.is_empty() {
            debug!("Configured secret and headers are left to the provided executor");
        }
        let policy = ExpirationPolicy::new(config.default_ttl())?;
        info!(
            uri = %config.uri,
            default_ttl_ms = config.options.ttl,
            compression = config.options.compression,
            "Hasura cache store initialized"
        );
        Ok(Self {
            executor,
            config,
            policy,
            codec: ValueCodec::default(),
            clock: Arc::new(SystemClock),
            headers: HashMap::new(),
        })
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Adds a header sent with every request issued by this store handle.
    pub fn with_request_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Configuration captured at construction.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Expiration policy derived from the configured default TTL.
    pub fn policy(&self) -> &ExpirationPolicy {
        &self.policy
    }

    async fn run(&self, document: &str, variables: Value) -> Result<Value> {
        self.executor.execute(document, variables, &self.headers).await
    }

    fn stored_value(&self, key: &str, value: CacheValue, compress: bool) -> Result<String> {
        if compress {
            return self.codec.encode(&value);
        }
        // Uncompressed rows read back as text, so only text may take this path.
        match value {
            CacheValue::Text(text) => Ok(text),
            CacheValue::Binary(_) => Err(StoreError::UnsupportedValueType(format!(
                "binary value for '{}' requires the compressed path",
                key
            ))),
        }
    }

    fn logical_value(&self, record: CacheRecord) -> Result<CacheValue> {
        if record.compressed {
            Ok(CacheValue::Binary(self.codec.decode(&record.value)?))
        } else {
            Ok(CacheValue::Text(record.value))
        }
    }
}

#[async_trait]
impl<E: QueryExecutor> CacheBackend for HasuraStore<E> {
    fn name(&self) -> &str {
        STORE_NAME
    }

    // == Get ==
    async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        let now = self.clock.now();
        let data = self
            .run(
                CACHE_GET,
                json!({ "key": key, "currentTimestamp": format_timestamp(now) }),
            )
            .await?;

        let Some(row) = rows(&data).into_iter().next() else {
            debug!(key = %key, "Cache miss");
            return Ok(None);
        };

        let record: CacheRecord = match serde_json::from_value(row.clone()) {
            Ok(record) => record,
            Err(e) => {
                warn!(key = %key, error = %e, "Unreadable cache row, treating as miss");
                return Ok(None);
            }
        };

        // The backend filtered with the request's timestamp; a fresh reading decides.
        if !self.policy.is_live(&record, self.clock.now()) {
            debug!(key = %key, expires_at = %record.expires_at, "Cache entry expired");
            return Ok(None);
        }

        debug!(key = %key, compressed = record.compressed, "Cache hit");
        self.logical_value(record).map(Some)
    }

    // == Set ==
    async fn set(&self, key: &str, value: CacheValue, options: SetOptions) -> Result<CacheRecord> {
        let now = self.clock.now();
        let expires_at = self.policy.compute_expiry(options.ttl, now)?;

        let compressed = options.compress && self.config.options.compression;
        if options.compress && !compressed {
            debug!(key = %key, "Compression requested but disabled for this store");
        }
        let stored = self.stored_value(key, value, compressed)?;

        let data = self
            .run(
                CACHE_SET,
                json!({
                    "key": key,
                    "value": stored,
                    "compressed": compressed,
                    "expiresAt": format_timestamp(expires_at),
                    "currentTimestamp": format_timestamp(now),
                }),
            )
            .await?;

        let purged = affected_rows(&data);
        if purged > 0 {
            debug!(purged, "Removed expired cache entries");
        }

        let row = data
            .get("insert_cache_one")
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or_else(|| {
                StoreError::Backend(format!("upsert of '{}' returned no record", key))
            })?;
        let record: CacheRecord = serde_json::from_value(row)
            .map_err(|e| StoreError::Backend(format!("unexpected upsert result: {}", e)))?;

        debug!(
            key = %key,
            expires_at = %record.expires_at,
            ttl_ms = record.ttl_remaining(now).num_milliseconds(),
            compressed,
            "Cache entry stored"
        );
        Ok(record)
    }

    // == Delete ==
    async fn del(&self, key: &str) -> Result<bool> {
        let data = self.run(CACHE_DEL, json!({ "key": key })).await?;
        let removed = affected_rows(&data);
        debug!(key = %key, removed, "Cache entry deleted");
        Ok(removed > 0)
    }

    // == Keys ==
    async fn keys(&self, pattern: Option<&str>) -> Result<Vec<String>> {
        let pattern = KeyPattern::from_glob(pattern);
        let now = self.clock.now();
        let data = self
            .run(
                CACHE_KEYS,
                json!({ "pattern": pattern.as_like(), "currentTimestamp": format_timestamp(now) }),
            )
            .await?;

        let now = self.clock.now();
        let keys: Vec<String> = rows(&data)
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<CacheRecord>(row.clone()) {
                Ok(record) if self.policy.is_live(&record, now) => Some(record.key),
                Ok(_) => None,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable cache row");
                    None
                }
            })
            .collect();

        debug!(pattern = %pattern.as_like(), count = keys.len(), "Listed cache keys");
        Ok(keys)
    }

    // == Reset ==
    async fn reset(&self, pattern: Option<&str>) -> Result<bool> {
        let pattern = KeyPattern::from_glob(pattern);
        let data = self
            .run(CACHE_RESET, json!({ "pattern": pattern.as_like() }))
            .await?;
        debug!(
            pattern = %pattern.as_like(),
            removed = affected_rows(&data),
            "Cache reset"
        );
        Ok(true)
    }
}

/// Rows under `data.cache`; anything else reads as no rows.
fn rows(data: &Value) -> Vec<&Value> {
    data.get(TABLE)
        .and_then(Value::as_array)
        .map(|rows| rows.iter().collect())
        .unwrap_or_default()
}

/// `data.delete_cache.affected_rows`, zero when absent.
fn affected_rows(data: &Value) -> u64 {
    data.get("delete_cache")
        .and_then(|d| d.get("affected_rows"))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}
