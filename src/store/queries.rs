//! GraphQL documents issued against the `cache` table.

/// Live record for one key.
pub const CACHE_GET: &str = r#"
query cacheGet($key: String!, $currentTimestamp: timestamptz) {
  cache(where: {
    key: { _eq: $key },
    expiresAt: { _gte: $currentTimestamp }
  }) {
    value
    compressed
    expiresAt
  }
}
"#;

/// Live keys matching a LIKE pattern.
pub const CACHE_KEYS: &str = r#"
query cacheKeys($pattern: String!, $currentTimestamp: timestamptz) {
  cache(where: {
    key: { _like: $pattern },
    expiresAt: { _gte: $currentTimestamp }
  }) {
    key
    expiresAt
  }
}
"#;

/// Purges expired rows and upserts one record in a single mutation, which
/// the backend runs as one transaction.
pub const CACHE_SET: &str = r#"
mutation cacheSet($key: String!, $value: String!, $compressed: Boolean!, $expiresAt: timestamptz, $currentTimestamp: timestamptz) {
  delete_cache(where: { expiresAt: { _lt: $currentTimestamp } }) {
    affected_rows
  }
  insert_cache_one(
    object: { key: $key, value: $value, compressed: $compressed, expiresAt: $expiresAt },
    on_conflict: { constraint: cache_pkey, update_columns: [value, compressed, expiresAt] }
  ) {
    key
    value
    compressed
    expiresAt
  }
}
"#;

/// Removes one key.
pub const CACHE_DEL: &str = r#"
mutation cacheDel($key: String!) {
  delete_cache(where: { key: { _eq: $key } }) {
    affected_rows
  }
}
"#;

/// Removes every key matching a LIKE pattern.
pub const CACHE_RESET: &str = r#"
mutation cacheReset($pattern: String!) {
  delete_cache(where: { key: { _like: $pattern } }) {
    affected_rows
  }
}
"#;
