//! Credential record persisted by the external OAuth2 login flow.
//!
//! The file is written by a browser-based login page and read-only to this
//! system. Fields beyond the token and expiry are optional identity metadata.

use serde::{Deserialize, Serialize};

/// Identity claims saved alongside the token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserClaims {
    /// Preferred username from the identity provider.
    #[serde(default)]
    pub preferred_username: Option<String>,

    /// Email address.
    #[serde(default)]
    pub email: Option<String>,

    /// Full display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// A credential record read from the saved credential file.
///
/// `access_token` and `expires_at` are required for the record to be usable;
/// both are modeled as options so validation can name the missing field.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialRecord {
    /// The bearer token.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Expiry as unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,

    /// Issue time as unix seconds, if recorded.
    #[serde(default)]
    pub issued_at: Option<i64>,

    /// Identity claims captured at login time.
    #[serde(default)]
    pub user_info: Option<UserClaims>,

    /// Identity-provider configuration snapshot (opaque).
    #[serde(default)]
    pub keycloak_config: Option<serde_json::Value>,
}

impl CredentialRecord {
    /// Returns true if both required fields are present.
    pub fn has_required_fields(&self) -> bool {
        self.access_token.is_some() && self.expires_at.is_some()
    }

    /// Returns the saved username, if any.
    pub fn username(&self) -> Option<&str> {
        self.user_info
            .as_ref()
            .and_then(|u| u.preferred_username.as_deref())
    }
}
