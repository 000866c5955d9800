//! Cache Record Module
//!
//! Defines the row shape persisted in the remote `cache` table and the
//! logical value handed to and returned from the store.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// == Cache Record ==
/// A row of the remote `cache` table as exchanged over GraphQL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    /// Primary key; absent from `get` selections
    #[serde(default)]
    pub key: String,
    /// Stored payload, base64-armored gzip when `compressed`
    #[serde(default)]
    pub value: String,
    /// Whether `value` went through the codec
    #[serde(default)]
    pub compressed: bool,
    /// Absolute expiry instant
    pub expires_at: DateTime<Utc>,
}

impl CacheRecord {
    // == Is Live ==
    /// Checks whether the record is still readable at `now`.
    ///
    /// A record whose expiry equals `now` is already dead.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    // == Time To Live ==
    /// Returns the remaining lifetime at `now`, zero once expired.
    pub fn ttl_remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        (self.expires_at - now).max(chrono::Duration::zero())
    }
}

// == Cache Value ==
/// Logical value stored under a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheValue {
    /// Plain text, stored as-is
    Text(String),
    /// Raw bytes; the only shape the codec accepts
    Binary(Vec<u8>),
}

impl CacheValue {
    /// Borrows the text form, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CacheValue::Text(s) => Some(s),
            CacheValue::Binary(_) => None,
        }
    }

    /// Borrows the raw bytes of either form.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            CacheValue::Text(s) => s.as_bytes(),
            CacheValue::Binary(b) => b,
        }
    }

    /// True for values that must take the compressed path.
    pub fn is_binary(&self) -> bool {
        matches!(self, CacheValue::Binary(_))
    }
}

impl From<String> for CacheValue {
    fn from(value: String) -> Self {
        CacheValue::Text(value)
    }
}

impl From<&str> for CacheValue {
    fn from(value: &str) -> Self {
        CacheValue::Text(value.to_string())
    }
}

impl From<Vec<u8>> for CacheValue {
    fn from(value: Vec<u8>) -> Self {
        CacheValue::Binary(value)
    }
}

// == Utility Functions ==
/// Formats a timestamp the way the backend filters expect it
/// (RFC 3339, UTC, millisecond precision).
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
