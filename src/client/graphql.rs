//! reqwest-backed GraphQL transport

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::QueryExecutor;
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};

/// Header carrying the admin credential.
pub const ADMIN_SECRET_HEADER: &str = "x-hasura-admin-secret";

/// GraphQL response wrapper
#[derive(Debug, Deserialize)]
struct GraphQLResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
}

/// HTTP client bound to one endpoint.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    client: Client,
    endpoint: String,
}

impl GraphqlClient {
    /// Builds a client from the store configuration.
    ///
    /// The admin secret and configured extra headers become default headers
    /// of every request.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        for (name, value) in &config.options.headers {
            let (name, value) = header_pair(name, value)?;
            headers.insert(name, value);
        }
        if let Some(ref secret) = config.options.secret {
            let (name, mut value) = header_pair(ADMIN_SECRET_HEADER, secret)?;
            value.set_sensitive(true);
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.uri.clone(),
        })
    }

    /// URL every request is posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl QueryExecutor for GraphqlClient {
    async fn execute(
        &self,
        document: &str,
        variables: Value,
        headers: &HashMap<String, String>,
    ) -> Result<Value> {
        let body = json!({
            "query": document,
            "variables": variables,
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        for (name, value) in headers {
            let (name, value) = header_pair(name, value)?;
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(StoreError::Transport(format!(
                "HTTP {}: {}",
                status, error_body
            )));
        }

        let result: GraphQLResponse = response.json().await?;
        if let Some(errors) = result.errors.filter(|e| !e.is_empty()) {
            let error_msg = errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(StoreError::Backend(error_msg));
        }

        debug!(endpoint = %self.endpoint, status = %status, "GraphQL round trip complete");
        Ok(result.data.unwrap_or(Value::Null))
    }
}

fn header_pair(name: &str, value: &str) -> Result<(header::HeaderName, header::HeaderValue)> {
    let header_name = header::HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| StoreError::Configuration(format!("invalid header name '{}': {}", name, e)))?;
    let header_value = header::HeaderValue::from_str(value)
        .map_err(|e| StoreError::Configuration(format!("invalid value for header '{}': {}", name, e)))?;
    Ok((header_name, header_value))
}
