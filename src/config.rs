//! Configuration management for the Porter adapters.
//!
//! This module handles loading configuration from environment variables,
//! with validation to ensure all required values are present. The credential
//! file path and identity-provider issuer are externally supplied rather
//! than hardcoded, so deployments can point at any realm or file location.

use std::env;
use std::path::PathBuf;

use url::Url;

use crate::error::PorterError;

/// Configuration for the helpdesk adapters.
///
/// `api_base_url` is required by both binaries. The credential path is
/// required only by the file-token adapter; the issuer URL is optional.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the helpdesk API (e.g., `http://localhost:8081`).
    pub api_base_url: String,

    /// Path to the saved credential JSON file (file-token adapter).
    pub credential_path: Option<PathBuf>,

    /// Identity-provider issuer URL used for the userinfo cross-check
    /// (e.g., `http://localhost:9000/realms/oauth-demo`).
    pub idp_issuer_url: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `HELPDESK_API_URL` (required): base URL of the helpdesk API
    /// - `HELPDESK_CREDENTIAL_FILE` (optional): credential file path
    /// - `HELPDESK_IDP_ISSUER` (optional): identity-provider issuer URL
    ///
    /// # Errors
    ///
    /// Returns `PorterError::Config` if a required variable is missing
    /// or a URL fails validation.
    pub fn from_env() -> Result<Self, PorterError> {
        let api_base_url = Self::get_required_env("HELPDESK_API_URL")?;
        let api_base_url = Self::validate_base_url(api_base_url)?;

        let credential_path = env::var("HELPDESK_CREDENTIAL_FILE")
            .ok()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let idp_issuer_url = match env::var("HELPDESK_IDP_ISSUER") {
            Ok(raw) if !raw.trim().is_empty() => Some(Self::validate_base_url(raw)?),
            _ => None,
        };

        Ok(Config {
            api_base_url,
            credential_path,
            idp_issuer_url,
        })
    }

    /// Returns the credential path, or a config error if it was not set.
    ///
    /// The file-token adapter calls this at startup; the session adapter
    /// never needs it.
    pub fn require_credential_path(&self) -> Result<&PathBuf, PorterError> {
        self.credential_path
            .as_ref()
            .ok_or_else(|| PorterError::missing_env("HELPDESK_CREDENTIAL_FILE"))
    }

    /// Gets a required environment variable, returning an error if missing or empty.
    fn get_required_env(name: &str) -> Result<String, PorterError> {
        env::var(name)
            .map_err(|_| PorterError::missing_env(name))
            .and_then(|value| {
                if value.trim().is_empty() {
                    Err(PorterError::missing_env(name))
                } else {
                    Ok(value)
                }
            })
    }

    /// Validates and normalizes a base URL.
    ///
    /// Trailing slashes are removed so paths can be appended verbatim.
    fn validate_base_url(url: String) -> Result<String, PorterError> {
        let url = url.trim().trim_end_matches('/').to_string();

        let parsed = Url::parse(&url)
            .map_err(|e| PorterError::invalid_config(format!("invalid URL {:?}: {}", url, e)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(PorterError::invalid_config(
                "URL must start with http:// or https://",
            ));
        }
        if parsed.host().is_none() {
            return Err(PorterError::invalid_config("URL must include a host"));
        }

        Ok(url)
    }
}
