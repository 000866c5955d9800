//! Hasura Cache - a cache-store backend over GraphQL
//!
//! Persists TTL-bound key/value records in a remote `cache` table reached
//! through a Hasura GraphQL endpoint, exposing get/set/del/keys/reset.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod store;

pub use cache::{CacheRecord, CacheValue};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use store::{CacheBackend, HasuraStore, SetOptions};
