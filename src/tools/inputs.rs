//! Tool input parameter structs for MCP tools.
//!
//! This module defines the input types for each MCP tool, with
//! JSON Schema derivation for MCP tool discovery.
//!
//! # Input Sanitization
//!
//! All input structs implement `sanitize()` which trims whitespace
//! from string fields. This should be called before processing input.

use rmcp::schemars::{self, JsonSchema};
use serde::Deserialize;

/// Helper function to trim an optional string.
fn trim_option(s: &Option<String>) -> Option<String> {
    s.as_ref()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Input parameters for the create_ticket tool.
///
/// Title and description are required; priority defaults to "medium".
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateTicketInput {
    /// Ticket title.
    pub title: String,

    /// Detailed description of the issue.
    pub description: String,

    /// Priority level: 'low', 'medium', 'high', or 'urgent'. Default: 'medium'.
    #[serde(default)]
    pub priority: Option<String>,
}

impl CreateTicketInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            priority: trim_option(&self.priority),
        }
    }

    /// Builds the creation payload sent to `POST /tickets`.
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "title": self.title,
            "description": self.description,
            "priority": self.priority.as_deref().unwrap_or("medium"),
        })
    }
}

/// Input parameters for the get_ticket tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTicketInput {
    /// The unique ID of the ticket to retrieve.
    pub ticket_id: String,
}

impl GetTicketInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            ticket_id: self.ticket_id.trim().to_string(),
        }
    }
}

/// Input parameters for the update_ticket tool.
///
/// Ticket ID is required. At least one other field must be provided;
/// only explicitly supplied fields are sent to the API.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateTicketInput {
    /// The unique ID of the ticket to update.
    pub ticket_id: String,

    /// New title.
    #[serde(default)]
    pub title: Option<String>,

    /// Updated description.
    #[serde(default)]
    pub description: Option<String>,

    /// New priority level: 'low', 'medium', 'high', or 'urgent'.
    #[serde(default)]
    pub priority: Option<String>,

    /// New status (e.g., 'open', 'in_progress', 'resolved', 'closed').
    #[serde(default)]
    pub status: Option<String>,

    /// Username to assign the ticket to.
    #[serde(default)]
    pub assigned_to: Option<String>,
}

impl UpdateTicketInput {
    /// Returns true if at least one field besides ticket_id is set.
    pub fn has_updates(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.priority.is_some()
            || self.status.is_some()
            || self.assigned_to.is_some()
    }

    /// Builds the partial-update payload containing only supplied fields.
    pub fn to_patch(&self) -> serde_json::Value {
        let mut patch = serde_json::Map::new();
        if let Some(ref title) = self.title {
            patch.insert("title".to_string(), serde_json::json!(title));
        }
        if let Some(ref description) = self.description {
            patch.insert("description".to_string(), serde_json::json!(description));
        }
        if let Some(ref priority) = self.priority {
            patch.insert("priority".to_string(), serde_json::json!(priority));
        }
        if let Some(ref status) = self.status {
            patch.insert("status".to_string(), serde_json::json!(status));
        }
        if let Some(ref assigned_to) = self.assigned_to {
            patch.insert("assigned_to".to_string(), serde_json::json!(assigned_to));
        }
        serde_json::Value::Object(patch)
    }

    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            ticket_id: self.ticket_id.trim().to_string(),
            title: trim_option(&self.title),
            description: trim_option(&self.description),
            priority: trim_option(&self.priority),
            status: trim_option(&self.status),
            assigned_to: trim_option(&self.assigned_to),
        }
    }
}

/// Input parameters for the register tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RegisterInput {
    /// Desired username.
    pub username: String,

    /// Email address.
    pub email: String,

    /// Password for the new account.
    pub password: String,

    /// Account role (e.g., 'user', 'agent'). Default: 'user'.
    #[serde(default)]
    pub role: Option<String>,
}

impl RegisterInput {
    /// Sanitizes input by trimming whitespace from all string fields
    /// except the password, which is forwarded verbatim.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
            role: trim_option(&self.role),
        }
    }
}

/// Input parameters for the login tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct LoginInput {
    /// Username to authenticate as.
    pub username: String,

    /// Account password.
    pub password: String,
}

impl LoginInput {
    /// Sanitizes input by trimming whitespace from the username.
    /// The password is forwarded verbatim.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            password: self.password,
        }
    }
}
