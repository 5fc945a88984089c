//! Session types for the session-based adapter.

use serde::Deserialize;

/// One authenticated identity held in the client's session slot.
///
/// The token never appears in tool output; status reporting uses the
/// username only.
#[derive(Debug, Clone)]
pub struct Session {
    /// Bearer token issued by `POST /login`.
    pub token: String,

    /// Username the token was issued for.
    pub username: String,
}

/// Response body of `POST /login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// The issued bearer token.
    pub access_token: String,

    /// Token type, normally "bearer".
    #[serde(default)]
    pub token_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_deserialize() {
        let json = r#"{"access_token": "tok123", "token_type": "bearer"}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "tok123");
        assert_eq!(resp.token_type.as_deref(), Some("bearer"));
    }

    #[test]
    fn test_login_response_token_type_optional() {
        let resp: LoginResponse = serde_json::from_str(r#"{"access_token": "t"}"#).unwrap();
        assert_eq!(resp.access_token, "t");
        assert!(resp.token_type.is_none());
    }
}
