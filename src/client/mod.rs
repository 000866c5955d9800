//! GraphQL Client Module
//!
//! Sends query/mutation documents to the configured endpoint and hands back
//! the `data` payload.

mod graphql;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use graphql::{GraphqlClient, ADMIN_SECRET_HEADER};

/// One round trip to a GraphQL endpoint.
///
/// Implementations perform exactly one request per call and never retry.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Executes `document` with `variables`, attaching `headers` on top of the
    /// executor's own authorization headers. Returns the response's `data`
    /// field, or `Value::Null` when the backend sent none.
    async fn execute(
        &self,
        document: &str,
        variables: Value,
        headers: &HashMap<String, String>,
    ) -> Result<Value>;
}
