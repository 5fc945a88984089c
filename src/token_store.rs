//! Credential-file reader and token validity checks.
//!
//! The credential file is written by an external OAuth2 login flow and may
//! change between calls, so it is re-read fresh on every operation — the
//! staleness window is a single call. Every failure mode (missing file,
//! permission error, malformed JSON, missing required fields) is soft: the
//! record is simply treated as absent and reported with remediation hints,
//! never raised as a fatal error.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::models::CredentialRecord;

/// Reads and validates the persisted credential record.
#[derive(Clone, Debug)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Creates a store for the given credential file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the configured credential file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the credential record from the file.
    ///
    /// Returns `None` on missing file, unreadable file, malformed JSON,
    /// or a record lacking `access_token` or `expires_at`.
    pub fn read(&self) -> Option<CredentialRecord> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "credential file unreadable");
                return None;
            }
        };

        let record: CredentialRecord = match serde_json::from_str(&contents) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "credential file malformed");
                return None;
            }
        };

        if !record.has_required_fields() {
            tracing::warn!(
                path = %self.path.display(),
                "credential file missing access_token or expires_at"
            );
            return None;
        }

        Some(record)
    }

    /// Resolves a usable bearer token at time `now` (unix seconds).
    ///
    /// Returns the token and a status message on success, or `None` and a
    /// human-readable message with a remediation hint.
    pub fn token(&self, now: i64) -> (Option<String>, String) {
        let Some(record) = self.read() else {
            return (
                None,
                format!(
                    "Credential file not found or invalid. Expected location: {}. \
                     Complete the identity-provider login and save the credential file, then retry.",
                    self.path.display()
                ),
            );
        };

        let (valid, reason) = validity(&record, now);
        if !valid {
            return (
                None,
                format!(
                    "Credential token invalid: {}. Log in again to refresh the saved credential.",
                    reason
                ),
            );
        }

        let username = record.username().unwrap_or("unknown").to_string();
        (
            record.access_token,
            format!("Valid credential found for user: {}", username),
        )
    }
}

/// Checks whether a credential record is valid at time `now` (unix seconds).
///
/// Returns `(valid, reason)`. The reason for an expired token includes the
/// expiry timestamp in human-readable form.
pub fn validity(record: &CredentialRecord, now: i64) -> (bool, String) {
    let Some(token) = record.access_token.as_deref() else {
        return (false, "no access token found".to_string());
    };
    if token.is_empty() {
        return (false, "no access token found".to_string());
    }

    let Some(expires_at) = record.expires_at else {
        return (false, "no expiry information found".to_string());
    };

    if now >= expires_at {
        return (
            false,
            format!("token expired at {}", format_timestamp(expires_at)),
        );
    }

    (true, "token is valid".to_string())
}

/// Formats a unix timestamp for display, falling back to the raw number
/// when it is out of chrono's representable range.
pub fn format_timestamp(unix_secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(unix_secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| unix_secs.to_string())
}
