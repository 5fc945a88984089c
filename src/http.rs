//! Scoped HTTP request wrapper for the helpdesk API.
//!
//! `ApiHandle` owns the underlying `reqwest::Client` and base URL for one
//! remote endpoint. Each logical operation acquires a [`RequestScope`] via
//! [`ApiHandle::scope`], optionally attaches a bearer token, issues its
//! requests, and releases the scope on every exit path when it drops.
//!
//! Semantics are single-attempt throughout: no retry, no backoff, no timeout
//! override beyond the transport default.
//!
//! # Security
//!
//! Bearer tokens are never logged. Error bodies are truncated before being
//! surfaced to avoid leaking verbose server internals.

use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde_json::Value;

use crate::error::PorterError;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum length for HTTP error response bodies surfaced to the host.
const MAX_ERROR_BODY_LEN: usize = 500;

/// Long-lived handle to one remote HTTP endpoint.
///
/// Cloning is cheap; the inner `reqwest::Client` shares its connection pool.
#[derive(Clone)]
pub struct ApiHandle {
    /// The underlying HTTP client.
    http: Client,

    /// Base URL with no trailing slash (e.g., `http://localhost:8081`).
    base_url: String,
}

impl ApiHandle {
    /// Creates a handle for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns `PorterError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(base_url: &str) -> Result<Self, PorterError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(PorterError::HttpClient)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Acquires a request scope for one logical operation.
    ///
    /// The scope carries no token by default; use
    /// [`RequestScope::with_bearer`] for authenticated calls.
    pub fn scope(&self) -> RequestScope<'_> {
        RequestScope {
            handle: self,
            bearer: None,
        }
    }
}

/// A request scope bound to one logical operation.
///
/// Borrowing the handle keeps the scope from outliving the client; dropping
/// it at the end of the operation releases the scope on every exit path,
/// including errors and early returns.
pub struct RequestScope<'a> {
    handle: &'a ApiHandle,
    bearer: Option<String>,
}

impl RequestScope<'_> {
    /// Attaches a bearer token to every request made through this scope.
    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Issues a single request and parses the JSON response body.
    ///
    /// `Content-Type: application/json` is always sent;
    /// `Authorization: Bearer <token>` only when a bearer is set.
    ///
    /// # Errors
    ///
    /// - `PorterError::Transport` for DNS, connection, or timeout failures
    /// - `PorterError::Api` for status codes >= 400, carrying the remote
    ///   `detail` message when the body provides one
    /// - `PorterError::Serialization` when a success body is not valid JSON
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, PorterError> {
        let url = format!("{}{}", self.handle.base_url, path);

        tracing::debug!(method = %method, path = %path, "issuing helpdesk API request");

        let mut req = self
            .handle
            .http
            .request(method, &url)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = &self.bearer {
            req = req.bearer_auth(token);
        }

        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(PorterError::Transport)?;
        let status = response.status();
        let text = response.text().await.map_err(PorterError::Transport)?;

        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(PorterError::from)
    }

    /// Issues a GET request.
    pub async fn get(&self, path: &str) -> Result<Value, PorterError> {
        self.request(Method::GET, path, None).await
    }

    /// Issues a POST request with a JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, PorterError> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Issues a PUT request with a JSON body.
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, PorterError> {
        self.request(Method::PUT, path, Some(body)).await
    }
}

/// Converts a non-success response into `PorterError::Api`.
///
/// Prefers the `detail` field the helpdesk API uses for error messages
/// (falling back to `message`), then the raw body, then a generic status line.
fn status_error(status: StatusCode, body: &str) -> PorterError {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("detail")
                .or_else(|| v.get("message"))
                .and_then(|d| match d {
                    Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else if trimmed.len() > MAX_ERROR_BODY_LEN {
                let cut = (0..=MAX_ERROR_BODY_LEN)
                    .rev()
                    .find(|&i| trimmed.is_char_boundary(i))
                    .unwrap_or(0);
                format!("{}...[truncated]", &trimmed[..cut])
            } else {
                trimmed.to_string()
            }
        });

    PorterError::Api { status, detail }
}
