//! In-process stand-in for a Hasura endpoint serving the `cache` table.
//!
//! Understands exactly the operations the store issues, keyed by operation
//! name, and keeps rows in memory.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

pub const GRAPHQL_PATH: &str = "/v1/graphql";

#[derive(Debug, Clone)]
pub struct Row {
    pub value: String,
    pub compressed: bool,
    pub expires_at: DateTime<Utc>,
}

/// Shared state of the fake backend.
#[derive(Debug, Default)]
pub struct Backend {
    pub rows: Mutex<HashMap<String, Row>>,
    pub admin_secret: Option<String>,
    pub fail_with_status: AtomicBool,
    pub requests: AtomicUsize,
    pub last_headers: Mutex<HeaderMap>,
}

#[derive(Debug, Deserialize)]
struct GraphqlRequest {
    query: String,
    #[serde(default)]
    variables: Value,
}

/// Running fake backend.
pub struct MockHasura {
    pub addr: SocketAddr,
    pub backend: Arc<Backend>,
    handle: JoinHandle<()>,
}

impl MockHasura {
    pub async fn start(admin_secret: Option<&str>) -> Self {
        let backend = Arc::new(Backend {
            admin_secret: admin_secret.map(str::to_string),
            ..Backend::default()
        });
        let app = Router::new()
            .route(GRAPHQL_PATH, post(graphql_handler))
            .with_state(backend.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            backend,
            handle,
        }
    }

    pub fn uri(&self) -> String {
        format!("http://{}{}", self.addr, GRAPHQL_PATH)
    }

    /// Inserts a row directly, bypassing the store.
    pub fn seed(&self, key: &str, value: &str, expires_at: DateTime<Utc>) {
        self.backend.rows.lock().unwrap().insert(
            key.to_string(),
            Row {
                value: value.to_string(),
                compressed: false,
                expires_at,
            },
        );
    }

    pub fn row(&self, key: &str) -> Option<Row> {
        self.backend.rows.lock().unwrap().get(key).cloned()
    }

    pub fn row_count(&self) -> usize {
        self.backend.rows.lock().unwrap().len()
    }

    pub fn request_count(&self) -> usize {
        self.backend.requests.load(Ordering::SeqCst)
    }

    pub fn last_header(&self, name: &str) -> Option<String> {
        self.backend
            .last_headers
            .lock()
            .unwrap()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    pub fn fail_requests(&self, fail: bool) {
        self.backend.fail_with_status.store(fail, Ordering::SeqCst);
    }
}

impl Drop for MockHasura {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn graphql_handler(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(req): Json<GraphqlRequest>,
) -> Response {
    backend.requests.fetch_add(1, Ordering::SeqCst);
    *backend.last_headers.lock().unwrap() = headers.clone();

    if backend.fail_with_status.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "upstream down").into_response();
    }

    if let Some(ref secret) = backend.admin_secret {
        let sent = headers
            .get("x-hasura-admin-secret")
            .and_then(|v| v.to_str().ok());
        if sent != Some(secret.as_str()) {
            return Json(graphql_error("invalid x-hasura-admin-secret/x-hasura-access-key"))
                .into_response();
        }
    }

    let vars = &req.variables;
    let mut rows = backend.rows.lock().unwrap();
    let body = if req.query.contains("cacheGet") {
        let key = str_var(vars, "key");
        let now = time_var(vars, "currentTimestamp");
        let found: Vec<Value> = rows
            .get(&key)
            .filter(|row| row.expires_at >= now)
            .map(|row| {
                json!({
                    "value": row.value,
                    "compressed": row.compressed,
                    "expiresAt": format_ts(row.expires_at),
                })
            })
            .into_iter()
            .collect();
        json!({ "data": { "cache": found } })
    } else if req.query.contains("cacheKeys") {
        let pattern = str_var(vars, "pattern");
        let now = time_var(vars, "currentTimestamp");
        let found: Vec<Value> = rows
            .iter()
            .filter(|(key, row)| like_matches(&pattern, key) && row.expires_at >= now)
            .map(|(key, row)| json!({ "key": key, "expiresAt": format_ts(row.expires_at) }))
            .collect();
        json!({ "data": { "cache": found } })
    } else if req.query.contains("cacheSet") {
        let now = time_var(vars, "currentTimestamp");
        let before = rows.len();
        rows.retain(|_, row| row.expires_at >= now);
        let purged = before - rows.len();

        let key = str_var(vars, "key");
        let row = Row {
            value: str_var(vars, "value"),
            compressed: vars["compressed"].as_bool().unwrap_or(false),
            expires_at: time_var(vars, "expiresAt"),
        };
        let returned = json!({
            "key": key,
            "value": row.value,
            "compressed": row.compressed,
            "expiresAt": format_ts(row.expires_at),
        });
        rows.insert(key, row);
        json!({ "data": {
            "delete_cache": { "affected_rows": purged },
            "insert_cache_one": returned,
        }})
    } else if req.query.contains("cacheDel") {
        let key = str_var(vars, "key");
        let removed = usize::from(rows.remove(&key).is_some());
        json!({ "data": { "delete_cache": { "affected_rows": removed } } })
    } else if req.query.contains("cacheReset") {
        let pattern = str_var(vars, "pattern");
        let before = rows.len();
        rows.retain(|key, _| !like_matches(&pattern, key));
        json!({ "data": { "delete_cache": { "affected_rows": before - rows.len() } } })
    } else {
        graphql_error("unknown operation")
    };

    Json(body).into_response()
}

fn graphql_error(message: &str) -> Value {
    json!({ "errors": [{ "message": message, "extensions": { "code": "validation-failed" } }] })
}

fn str_var(vars: &Value, name: &str) -> String {
    vars[name].as_str().unwrap_or_default().to_string()
}

fn time_var(vars: &Value, name: &str) -> DateTime<Utc> {
    vars[name]
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(Utc::now)
}

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, false)
}

#[derive(Debug, PartialEq)]
enum Token {
    Any,
    One,
    Lit(char),
}

/// Postgres LIKE with `\` as escape character.
pub fn like_matches(pattern: &str, text: &str) -> bool {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        tokens.push(match ch {
            '%' => Token::Any,
            '_' => Token::One,
            '\\' => Token::Lit(chars.next().unwrap_or('\\')),
            other => Token::Lit(other),
        });
    }
    let text: Vec<char> = text.chars().collect();
    matches_from(&tokens, &text)
}

fn matches_from(tokens: &[Token], text: &[char]) -> bool {
    match tokens.split_first() {
        None => text.is_empty(),
        Some((Token::Any, rest)) => (0..=text.len()).any(|i| matches_from(rest, &text[i..])),
        Some((Token::One, rest)) => !text.is_empty() && matches_from(rest, &text[1..]),
        Some((Token::Lit(c), rest)) => text.first() == Some(c) && matches_from(rest, &text[1..]),
    }
}
