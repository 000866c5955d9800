//! Error types for the cache store
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Store Error Enum ==
/// Unified error type for the cache store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The GraphQL endpoint could not be reached or answered with a non-2xx status
    #[error("Transport error: {0}")]
    Transport(String),

    /// The HTTP client itself failed (connect, timeout, body decoding)
    #[error("Transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with GraphQL `errors` instead of data
    #[error("Backend error: {0}")]
    Backend(String),

    /// Stored compressed bytes could not be decoded
    #[error("Codec error: {0}")]
    Codec(String),

    /// The value cannot take the requested storage path
    #[error("Unsupported value type: {0}")]
    UnsupportedValueType(String),

    /// Invalid store configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StoreError {
    /// True for failures that happened before a GraphQL response was obtained.
    pub fn is_transport(&self) -> bool {
        matches!(self, StoreError::Transport(_) | StoreError::Http(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache store.
pub type Result<T> = std::result::Result<T, StoreError>;
