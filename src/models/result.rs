//! The uniform operation result returned to the host by every tool.
//!
//! Success results carry a domain payload (ticket, tickets, user, stats)
//! flattened into the object; failure results carry an error string and
//! optional remediation hints. The host never sees a raised error.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::PorterError;

/// Structured success/failure result for one operation.
#[derive(Debug, Clone, Serialize)]
pub struct OperationResult {
    /// Whether the operation succeeded.
    pub success: bool,

    /// Human-readable summary of the outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Error description (failure only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Remediation hint (failure only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Step-by-step remediation instructions, when a concrete sequence exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Vec<String>>,

    /// Domain payload, flattened into the result object.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl OperationResult {
    /// Creates a success result with no payload.
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            error: None,
            suggestion: None,
            instructions: None,
            payload: Map::new(),
        }
    }

    /// Creates a failure result from an error description.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            suggestion: None,
            instructions: None,
            payload: Map::new(),
        }
    }

    /// Creates a failure result from a `PorterError`, carrying its
    /// remediation suggestion when one exists.
    pub fn from_error(err: &PorterError) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(err.to_string()),
            suggestion: err.suggestion(),
            instructions: None,
            payload: Map::new(),
        }
    }

    /// Sets the human-readable summary.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the remediation hint.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Sets step-by-step remediation instructions.
    #[must_use]
    pub fn with_instructions<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions = Some(steps.into_iter().map(Into::into).collect());
        self
    }

    /// Adds one payload field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// Serializes the result to the JSON string handed to the host.
    ///
    /// Serialization of this shape cannot fail in practice; a fallback
    /// object is returned rather than panicking in a tool handler.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| {
            r#"{"success": false, "error": "internal serialization failure"}"#.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;

    #[test]
    fn test_ok_result_shape() {
        let json: Value =
            serde_json::from_str(&OperationResult::ok().with_message("done").to_json()).unwrap();
        assert_eq!(json["success"], Value::Bool(true));
        assert_eq!(json["message"], Value::String("done".to_string()));
        assert!(json.get("error").is_none());
        assert!(json.get("suggestion").is_none());
    }

    #[test]
    fn test_failure_result_shape() {
        let result = OperationResult::failure("Authentication required")
            .with_suggestion("Use check_auth_status for details");
        let json: Value = serde_json::from_str(&result.to_json()).unwrap();
        assert_eq!(json["success"], Value::Bool(false));
        assert_eq!(json["error"], "Authentication required");
        assert_eq!(json["suggestion"], "Use check_auth_status for details");
    }

    #[test]
    fn test_payload_fields_are_flattened() {
        let result = OperationResult::ok()
            .with_field("ticket", serde_json::json!({"id": 7}))
            .with_field("count", serde_json::json!(1));
        let json: Value = serde_json::from_str(&result.to_json()).unwrap();
        assert_eq!(json["ticket"]["id"], 7);
        assert_eq!(json["count"], 1);
    }

    #[test]
    fn test_from_error_carries_suggestion() {
        let err = PorterError::Api {
            status: StatusCode::UNAUTHORIZED,
            detail: "Could not validate credentials".to_string(),
        };
        let result = OperationResult::from_error(&err);
        assert!(!result.success);
        assert!(result.error.unwrap().contains("401"));
        assert!(result.suggestion.unwrap().contains("Log in again"));
    }

    #[test]
    fn test_instructions_serialized_as_list() {
        let result = OperationResult::failure("Token expired").with_instructions([
            "Open the login page",
            "Complete the OAuth2 flow",
            "Save the new credential file",
        ]);
        let json: Value = serde_json::from_str(&result.to_json()).unwrap();
        assert_eq!(json["instructions"].as_array().unwrap().len(), 3);
    }
}
