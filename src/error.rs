//! Error types for the Porter adapters.
//!
//! This module defines `PorterError`, the unified error type used throughout
//! the library.
//!
//! # Taxonomy
//!
//! Errors fall into three groups that the MCP servers report differently:
//!
//! - **Local precondition failures** (`NotLoggedIn`, `NoUpdateFields`,
//!   `Validation`) — reported immediately, no network call is made.
//! - **Transport failures** (`Transport`) — DNS, connection refused, timeout;
//!   reported as connectivity errors with a remediation suggestion.
//! - **Remote HTTP errors** (`Api`) — status >= 400, carrying the
//!   remote-supplied detail message when available.
//!
//! No error is retried automatically and none terminates the host process.

use reqwest::StatusCode;
use thiserror::Error;

/// Unified error type for all Porter operations.
#[derive(Error, Debug)]
pub enum PorterError {
    /// Configuration error - missing or invalid environment variables.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// Transport-level failure: DNS, connection refused, or timeout.
    #[error("connection error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The remote API returned a non-success status code.
    #[error("API error: HTTP {status}: {detail}")]
    Api {
        /// The HTTP status code returned.
        status: StatusCode,
        /// Remote-supplied detail message, or a generic status description.
        detail: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An authenticated operation was invoked without a session.
    #[error("not logged in")]
    NotLoggedIn,

    /// An update was requested with zero fields supplied.
    #[error("no update data provided")]
    NoUpdateFields,

    /// Input validation failed.
    #[error("validation error: {0}")]
    Validation(String),
}

impl PorterError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        PorterError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        PorterError::Config(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        PorterError::Validation(message.into())
    }

    /// Returns true if this error was produced before any network call.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            PorterError::NotLoggedIn
                | PorterError::NoUpdateFields
                | PorterError::Validation(_)
                | PorterError::Config(_)
        )
    }

    /// Returns true if this is a transport-level connectivity failure.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, PorterError::Transport(_))
    }

    /// Returns true if the remote API rejected the bearer token.
    #[must_use]
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            PorterError::Api { status, .. } if *status == StatusCode::UNAUTHORIZED
        )
    }

    /// Returns a remediation hint suitable for the operation result.
    #[must_use]
    pub fn suggestion(&self) -> Option<String> {
        match self {
            PorterError::Transport(_) => Some(
                "Check that the helpdesk API server is running and HELPDESK_API_URL is correct."
                    .to_string(),
            ),
            PorterError::Api { status, .. } if *status == StatusCode::UNAUTHORIZED => Some(
                "The token was rejected by the API. Log in again to obtain a fresh token."
                    .to_string(),
            ),
            PorterError::NotLoggedIn => Some("Use the login tool first.".to_string()),
            PorterError::NoUpdateFields => Some(
                "Provide at least one field to update (title, description, priority, status, or assigned_to)."
                    .to_string(),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_error() {
        let err = PorterError::missing_env("HELPDESK_API_URL");
        assert!(err.to_string().contains("HELPDESK_API_URL"));
        assert!(err.to_string().contains("missing"));
        assert!(err.is_local());
    }

    #[test]
    fn test_validation_error() {
        let err = PorterError::validation("ticket_id must be numeric");
        assert_eq!(
            err.to_string(),
            "validation error: ticket_id must be numeric"
        );
        assert!(err.is_local());
    }

    #[test]
    fn test_not_logged_in_is_local_with_suggestion() {
        let err = PorterError::NotLoggedIn;
        assert!(err.is_local());
        assert!(err.suggestion().unwrap().contains("login"));
    }

    #[test]
    fn test_no_update_fields_is_local() {
        let err = PorterError::NoUpdateFields;
        assert_eq!(err.to_string(), "no update data provided");
        assert!(err.is_local());
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_api_error_display() {
        let err = PorterError::Api {
            status: StatusCode::NOT_FOUND,
            detail: "Ticket not found".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("Ticket not found"));
        assert!(!err.is_local());
        assert!(!err.is_transport());
    }

    #[test]
    fn test_unauthorized_suggests_relogin() {
        let err = PorterError::Api {
            status: StatusCode::UNAUTHORIZED,
            detail: "Could not validate credentials".to_string(),
        };
        assert!(err.is_auth_rejection());
        assert!(err.suggestion().unwrap().contains("Log in again"));
    }

    #[test]
    fn test_serialization_error_has_no_suggestion() {
        let err: PorterError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(err.suggestion().is_none());
        assert!(!err.is_local());
    }
}
