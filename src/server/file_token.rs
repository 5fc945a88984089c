//! MCP server for the file-token adapter (`porter-file`).
//!
//! Every tool resolves the bearer token fresh from the credential file, so
//! a login completed in the browser becomes visible on the next call with
//! no restart. Operations that cannot resolve a token fail with a structured
//! result before any network access.

use chrono::Utc;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use serde_json::Value;

use crate::error::PorterError;
use crate::http::ApiHandle;
use crate::models::OperationResult;
use crate::token_store::{self, TokenStore};
use crate::tools::{CreateTicketInput, GetTicketInput};

/// Path under the issuer URL for the OpenID Connect userinfo endpoint.
const USERINFO_PATH: &str = "/protocol/openid-connect/userinfo";

/// The file-token MCP server.
#[derive(Clone)]
pub struct FileTokenServer {
    /// Credential file reader.
    store: TokenStore,
    /// Handle to the helpdesk API.
    api: ApiHandle,
    /// Handle to the identity provider, when an issuer is configured.
    idp: Option<ApiHandle>,
    /// Tool router for MCP tool dispatch.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl FileTokenServer {
    /// Creates a new file-token server instance.
    pub fn new(store: TokenStore, api: ApiHandle, idp: Option<ApiHandle>) -> Self {
        Self {
            store,
            api,
            idp,
            tool_router: Self::tool_router(),
        }
    }

    /// Resolves a bearer token, or builds the standard failure result.
    fn resolve_token(&self) -> Result<(String, String), OperationResult> {
        let (token, message) = self.store.token(Utc::now().timestamp());
        match token {
            Some(token) => Ok((token, message)),
            None => Err(OperationResult::failure("Authentication required")
                .with_message(message)
                .with_suggestion("Use check_auth_status for details")),
        }
    }

    /// A simple ping tool to verify the server is running.
    #[tool(description = "Test connectivity to the Porter MCP server. Returns 'pong' if the server is running correctly.")]
    fn ping(&self) -> String {
        tracing::debug!("ping tool called");
        "pong".to_string()
    }

    /// Report detailed authentication status from the credential file.
    #[tool(description = "Check authentication status by reading the saved credential file. Reports token validity, expiry, and the saved identity claims.")]
    async fn check_auth_status(&self) -> String {
        tracing::debug!("check_auth_status tool called");

        let now = Utc::now().timestamp();
        let path = self.store.path().display().to_string();

        let Some(record) = self.store.read() else {
            return OperationResult::failure("Credential file not found or invalid")
                .with_field("authenticated", Value::Bool(false))
                .with_field("file_path", Value::String(path))
                .with_instructions([
                    "1. Open the identity-provider login page in your browser",
                    "2. Complete the OAuth2 login",
                    "3. Save the credential file to the configured location",
                    "4. Try again",
                ])
                .to_json();
        };

        let (valid, reason) = token_store::validity(&record, now);
        let expires_at = record.expires_at.unwrap_or(0);

        let mut result = OperationResult::ok()
            .with_field("authenticated", Value::Bool(valid))
            .with_field("file_path", Value::String(path))
            .with_field("validation_reason", Value::String(reason))
            .with_field(
                "user_info",
                serde_json::to_value(record.user_info.clone().unwrap_or_default())
                    .unwrap_or(Value::Null),
            )
            .with_field(
                "token_info",
                serde_json::json!({
                    "expires_at": record.expires_at,
                    "expires_at_readable": token_store::format_timestamp(expires_at),
                    "issued_at": record.issued_at,
                    "time_until_expiry": (expires_at - now).max(0),
                }),
            )
            .with_field(
                "keycloak_config",
                record.keycloak_config.clone().unwrap_or(Value::Null),
            );

        if !valid {
            result = result.with_instructions([
                "Token is invalid or expired. Log in again:",
                "1. Open the identity-provider login page",
                "2. Complete the OAuth2 flow",
                "3. Save the new credential file",
            ]);
        }

        result.to_json()
    }

    /// Create a new support ticket using the file-based token.
    #[tool(description = "Create a new support ticket. Title and description are required; priority defaults to 'medium'.")]
    async fn create_ticket(&self, Parameters(input): Parameters<CreateTicketInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(title = %input.title, "create_ticket tool called");

        if input.title.is_empty() {
            return OperationResult::failure("Title is required and cannot be empty").to_json();
        }

        let (token, auth_message) = match self.resolve_token() {
            Ok(resolved) => resolved,
            Err(failure) => return failure.to_json(),
        };

        match self
            .api
            .scope()
            .with_bearer(token)
            .post("/tickets", &input.to_payload())
            .await
        {
            Ok(ticket) => OperationResult::ok()
                .with_message("Ticket created successfully")
                .with_field("ticket", ticket)
                .with_field("auth_status", Value::String(auth_message))
                .to_json(),
            Err(e) => {
                tracing::error!(error = %e, "failed to create ticket");
                OperationResult::from_error(&e).to_json()
            }
        }
    }

    /// List all tickets accessible to the current user.
    #[tool(description = "List all tickets accessible to the current user.")]
    async fn list_tickets(&self) -> String {
        tracing::debug!("list_tickets tool called");

        let (token, auth_message) = match self.resolve_token() {
            Ok(resolved) => resolved,
            Err(failure) => return failure.to_json(),
        };

        match self.api.scope().with_bearer(token).get("/tickets").await {
            Ok(tickets) => {
                let count = tickets.as_array().map(|a| a.len()).unwrap_or(0);
                OperationResult::ok()
                    .with_message(format!("Found {} ticket(s)", count))
                    .with_field("tickets", tickets)
                    .with_field("count", Value::from(count))
                    .with_field("auth_status", Value::String(auth_message))
                    .to_json()
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to list tickets");
                OperationResult::from_error(&e).to_json()
            }
        }
    }

    /// Get one ticket by ID.
    #[tool(description = "Get full details of a single ticket by ID.")]
    async fn get_ticket(&self, Parameters(input): Parameters<GetTicketInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(ticket_id = %input.ticket_id, "get_ticket tool called");

        if input.ticket_id.is_empty() || !input.ticket_id.bytes().all(|b| b.is_ascii_digit()) {
            return OperationResult::from_error(&PorterError::validation(
                "ticket_id must be a numeric string",
            ))
            .to_json();
        }

        let (token, _) = match self.resolve_token() {
            Ok(resolved) => resolved,
            Err(failure) => return failure.to_json(),
        };

        match self
            .api
            .scope()
            .with_bearer(token)
            .get(&format!("/tickets/{}", input.ticket_id))
            .await
        {
            Ok(ticket) => OperationResult::ok()
                .with_field("ticket", ticket)
                .to_json(),
            Err(e) => {
                tracing::error!(error = %e, ticket_id = %input.ticket_id, "failed to get ticket");
                OperationResult::from_error(&e).to_json()
            }
        }
    }

    /// Get user information from the credential file, the helpdesk API,
    /// and (when configured) the identity provider.
    #[tool(description = "Get current user information from the credential file, the helpdesk API, and the identity provider userinfo endpoint.")]
    async fn get_user_info(&self) -> String {
        tracing::debug!("get_user_info tool called");

        let (token, auth_message) = match self.resolve_token() {
            Ok(resolved) => resolved,
            Err(failure) => return failure.to_json(),
        };

        let file_claims = self
            .store
            .read()
            .and_then(|r| serde_json::to_value(r.user_info.unwrap_or_default()).ok())
            .unwrap_or(Value::Null);

        // HTTP-level rejections leave the individual source empty, matching
        // the soft cross-check behaviour; transport failures abort the call.
        let api_user_info = match self
            .api
            .scope()
            .with_bearer(&token)
            .get("/users/me")
            .await
        {
            Ok(info) => info,
            Err(e @ PorterError::Api { .. }) => {
                tracing::warn!(error = %e, "API userinfo lookup rejected");
                Value::Null
            }
            Err(e) => return OperationResult::from_error(&e).to_json(),
        };

        let idp_user_info = match &self.idp {
            Some(idp) => match idp.scope().with_bearer(&token).get(USERINFO_PATH).await {
                Ok(info) => info,
                Err(e @ PorterError::Api { .. }) => {
                    tracing::warn!(error = %e, "identity-provider userinfo lookup rejected");
                    Value::Null
                }
                Err(e) => return OperationResult::from_error(&e).to_json(),
            },
            None => Value::Null,
        };

        OperationResult::ok()
            .with_field("file_user_info", file_claims)
            .with_field("api_user_info", api_user_info)
            .with_field("idp_user_info", idp_user_info)
            .with_field("auth_status", Value::String(auth_message))
            .to_json()
    }

    /// Step-by-step instructions for refreshing authentication.
    #[tool(description = "Get step-by-step instructions for refreshing authentication when the saved credential is missing or expired.")]
    async fn refresh_instructions(&self) -> String {
        tracing::debug!("refresh_instructions tool called");

        OperationResult::ok()
            .with_message("How to refresh authentication")
            .with_instructions([
                "1. Open the identity-provider login page in your browser".to_string(),
                "2. Complete the OAuth2 login flow".to_string(),
                "3. Save the issued credential as JSON".to_string(),
                format!("4. Place the file at: {}", self.store.path().display()),
                "5. Use check_auth_status to verify".to_string(),
            ])
            .with_field(
                "credential_file",
                Value::String(self.store.path().display().to_string()),
            )
            .to_json()
    }
}

#[tool_handler]
impl ServerHandler for FileTokenServer {
    /// Returns server information for the MCP initialize handshake.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Porter (file-token) provides helpdesk ticket access using a \
                 credential file written by an external OAuth2 login. \
                 Use check_auth_status to inspect the saved credential, \
                 create_ticket and list_tickets to manage tickets, \
                 get_user_info for identity details, and refresh_instructions \
                 when the credential is missing or expired. \
                 Start with 'ping' to verify connectivity."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credential_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    fn server_with(file: &NamedTempFile, api_url: &str) -> FileTokenServer {
        FileTokenServer::new(
            TokenStore::new(file.path()),
            ApiHandle::new(api_url).unwrap(),
            None,
        )
    }

    #[test]
    fn test_server_info_has_tools_capability() {
        let file = credential_file("{}");
        let server = server_with(&file, "http://localhost:8081");
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.is_some());
    }

    #[test]
    fn test_ping_tool_returns_pong() {
        let file = credential_file("{}");
        let server = server_with(&file, "http://localhost:8081");
        assert_eq!(server.ping(), "pong");
    }

    #[tokio::test]
    async fn test_check_auth_status_missing_file() {
        let server = FileTokenServer::new(
            TokenStore::new("/nonexistent/saved_jwt.json"),
            ApiHandle::new("http://localhost:8081").unwrap(),
            None,
        );
        let result: Value = serde_json::from_str(&server.check_auth_status().await).unwrap();
        assert_eq!(result["success"], false);
        assert_eq!(result["authenticated"], false);
        assert!(result["instructions"].is_array());
        assert!(result["file_path"]
            .as_str()
            .unwrap()
            .contains("saved_jwt.json"));
    }

    #[tokio::test]
    async fn test_check_auth_status_expired_token() {
        let file = credential_file(
            r#"{"access_token": "abc", "expires_at": 1000, "issued_at": 500}"#,
        );
        let server = server_with(&file, "http://localhost:8081");

        let result: Value = serde_json::from_str(&server.check_auth_status().await).unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["authenticated"], false);
        assert!(result["validation_reason"]
            .as_str()
            .unwrap()
            .contains("expired"));
        assert_eq!(result["token_info"]["time_until_expiry"], 0);
        assert!(result["instructions"].is_array());
    }

    #[tokio::test]
    async fn test_check_auth_status_valid_token() {
        let file = credential_file(
            r#"{
                "access_token": "abc",
                "expires_at": 9999999999,
                "user_info": {"preferred_username": "testuser", "email": "t@example.com"}
            }"#,
        );
        let server = server_with(&file, "http://localhost:8081");

        let result: Value = serde_json::from_str(&server.check_auth_status().await).unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["authenticated"], true);
        assert_eq!(result["user_info"]["preferred_username"], "testuser");
        assert!(result.get("instructions").is_none());
    }

    #[tokio::test]
    async fn test_create_ticket_without_credential_makes_no_network_call() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock)
            .await;

        let server = FileTokenServer::new(
            TokenStore::new("/nonexistent/saved_jwt.json"),
            ApiHandle::new(&mock.uri()).unwrap(),
            None,
        );

        let input: CreateTicketInput =
            serde_json::from_str(r#"{"title": "t", "description": "d"}"#).unwrap();
        let result: Value =
            serde_json::from_str(&server.create_ticket(Parameters(input)).await).unwrap();
        assert_eq!(result["success"], false);
        assert_eq!(result["error"], "Authentication required");
        assert!(result["suggestion"]
            .as_str()
            .unwrap()
            .contains("check_auth_status"));
    }

    #[tokio::test]
    async fn test_create_ticket_sends_file_token() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tickets"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 7,
                "title": "Printer broken",
                "priority": "high"
            })))
            .expect(1)
            .mount(&mock)
            .await;

        let file =
            credential_file(r#"{"access_token": "abc", "expires_at": 9999999999}"#);
        let server = server_with(&file, &mock.uri());

        let input: CreateTicketInput = serde_json::from_str(
            r#"{"title": "Printer broken", "description": "3rd floor", "priority": "high"}"#,
        )
        .unwrap();
        let result: Value =
            serde_json::from_str(&server.create_ticket(Parameters(input)).await).unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["ticket"]["id"], 7);
    }

    #[tokio::test]
    async fn test_list_tickets_reports_count() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tickets"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"id": 1}, {"id": 2}])),
            )
            .mount(&mock)
            .await;

        let file =
            credential_file(r#"{"access_token": "abc", "expires_at": 9999999999}"#);
        let server = server_with(&file, &mock.uri());

        let result: Value = serde_json::from_str(&server.list_tickets().await).unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["count"], 2);
    }

    #[tokio::test]
    async fn test_get_ticket_rejects_non_numeric_id() {
        let file =
            credential_file(r#"{"access_token": "abc", "expires_at": 9999999999}"#);
        let server = server_with(&file, "http://localhost:8081");

        let input: GetTicketInput =
            serde_json::from_str(r#"{"ticket_id": "../etc"}"#).unwrap();
        let result: Value =
            serde_json::from_str(&server.get_ticket(Parameters(input)).await).unwrap();
        assert_eq!(result["success"], false);
        assert!(result["error"].as_str().unwrap().contains("numeric"));
    }

    #[tokio::test]
    async fn test_get_user_info_merges_sources() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"username": "testuser"})),
            )
            .mount(&mock)
            .await;
        Mock::given(method("GET"))
            .and(path("/protocol/openid-connect/userinfo"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"sub": "1234", "email": "t@example.com"})),
            )
            .mount(&mock)
            .await;

        let file = credential_file(
            r#"{
                "access_token": "abc",
                "expires_at": 9999999999,
                "user_info": {"preferred_username": "testuser"}
            }"#,
        );
        let server = FileTokenServer::new(
            TokenStore::new(file.path()),
            ApiHandle::new(&mock.uri()).unwrap(),
            Some(ApiHandle::new(&mock.uri()).unwrap()),
        );

        let result: Value = serde_json::from_str(&server.get_user_info().await).unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["file_user_info"]["preferred_username"], "testuser");
        assert_eq!(result["api_user_info"]["username"], "testuser");
        assert_eq!(result["idp_user_info"]["sub"], "1234");
    }

    #[tokio::test]
    async fn test_get_user_info_tolerates_api_rejection() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"detail": "expired"})),
            )
            .mount(&mock)
            .await;

        let file =
            credential_file(r#"{"access_token": "abc", "expires_at": 9999999999}"#);
        let server = server_with(&file, &mock.uri());

        let result: Value = serde_json::from_str(&server.get_user_info().await).unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["api_user_info"], Value::Null);
    }

    #[tokio::test]
    async fn test_refresh_instructions_names_credential_path() {
        let file = credential_file("{}");
        let server = server_with(&file, "http://localhost:8081");

        let result: Value =
            serde_json::from_str(&server.refresh_instructions().await).unwrap();
        assert_eq!(result["success"], true);
        let steps = result["instructions"].as_array().unwrap();
        assert!(steps
            .iter()
            .any(|s| s.as_str().unwrap().contains("check_auth_status")));
        assert!(result["credential_file"].as_str().is_some());
    }
}
