//! MCP server for the session-based adapter (`porter-session`).
//!
//! Tools delegate to [`SessionClient`], which owns the single session slot.
//! Authenticated tools called while logged out return a structured failure
//! without touching the network.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use serde_json::Value;

use crate::models::OperationResult;
use crate::session_client::SessionClient;
use crate::tools::{
    CreateTicketInput, GetTicketInput, LoginInput, RegisterInput, UpdateTicketInput,
};

/// The session-based MCP server.
pub struct SessionServer {
    /// Client owning the session slot and API handle.
    client: SessionClient,
    /// Tool router for MCP tool dispatch.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SessionServer {
    /// Creates a new session server instance.
    pub fn new(client: SessionClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    /// A simple ping tool to verify the server is running.
    #[tool(description = "Test connectivity to the Porter MCP server. Returns 'pong' if the server is running correctly.")]
    fn ping(&self) -> String {
        tracing::debug!("ping tool called");
        "pong".to_string()
    }

    /// Register a new helpdesk account.
    #[tool(description = "Register a new helpdesk account. Does not log in; use the login tool afterwards.")]
    async fn register(&self, Parameters(input): Parameters<RegisterInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(username = %input.username, "register tool called");

        if input.username.is_empty() || input.email.is_empty() || input.password.is_empty() {
            return OperationResult::failure(
                "username, email, and password are required and cannot be empty",
            )
            .to_json();
        }

        match self
            .client
            .register(
                &input.username,
                &input.email,
                &input.password,
                input.role.as_deref(),
            )
            .await
        {
            Ok(user) => OperationResult::ok()
                .with_message(format!("Registered account '{}'", input.username))
                .with_field("user", user)
                .to_json(),
            Err(e) => {
                tracing::error!(error = %e, "registration failed");
                OperationResult::from_error(&e).to_json()
            }
        }
    }

    /// Log in and establish the session.
    #[tool(description = "Log in to the helpdesk API. On success the session is held in memory and used by all subsequent tools until logout.")]
    async fn login(&self, Parameters(input): Parameters<LoginInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(username = %input.username, "login tool called");

        if input.username.is_empty() || input.password.is_empty() {
            return OperationResult::failure("username and password are required").to_json();
        }

        match self.client.login(&input.username, &input.password).await {
            Ok(session) => OperationResult::ok()
                .with_message(format!("Logged in as '{}'", session.username))
                .with_field("username", Value::String(session.username))
                .to_json(),
            Err(e) => {
                tracing::error!(error = %e, "login failed");
                OperationResult::from_error(&e).to_json()
            }
        }
    }

    /// Clear the session. Idempotent.
    #[tool(description = "Log out, clearing the in-memory session. Safe to call when already logged out.")]
    async fn logout(&self) -> String {
        tracing::debug!("logout tool called");

        match self.client.logout().await {
            Some(username) => OperationResult::ok()
                .with_message(format!("Logged out '{}'", username))
                .to_json(),
            None => OperationResult::ok()
                .with_message("No active session")
                .to_json(),
        }
    }

    /// Report API connectivity and the current session.
    #[tool(description = "Report helpdesk API connectivity and the current session username. Never exposes the token.")]
    async fn status(&self) -> String {
        tracing::debug!("status tool called");

        let username = self.client.session().await.map(|s| s.username);
        let logged_in = username.is_some();

        match self.client.probe().await {
            Ok(_) => OperationResult::ok()
                .with_message("Helpdesk API is reachable")
                .with_field("connected", Value::Bool(true))
                .with_field("logged_in", Value::Bool(logged_in))
                .with_field(
                    "username",
                    username.map(Value::String).unwrap_or(Value::Null),
                )
                .with_field(
                    "api_url",
                    Value::String(self.client.api().base_url().to_string()),
                )
                .to_json(),
            Err(e) => OperationResult::from_error(&e)
                .with_field("connected", Value::Bool(false))
                .with_field("logged_in", Value::Bool(logged_in))
                .with_field(
                    "username",
                    username.map(Value::String).unwrap_or(Value::Null),
                )
                .to_json(),
        }
    }

    /// Create a new support ticket.
    #[tool(description = "Create a new support ticket. Title and description are required; priority defaults to 'medium'. Requires login.")]
    async fn create_ticket(&self, Parameters(input): Parameters<CreateTicketInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(title = %input.title, "create_ticket tool called");

        if input.title.is_empty() {
            return OperationResult::failure("Title is required and cannot be empty").to_json();
        }

        match self.client.create_ticket(&input).await {
            Ok(ticket) => OperationResult::ok()
                .with_message("Ticket created successfully")
                .with_field("ticket", ticket)
                .to_json(),
            Err(e) => {
                tracing::error!(error = %e, "failed to create ticket");
                OperationResult::from_error(&e).to_json()
            }
        }
    }

    /// List tickets accessible to the session user.
    #[tool(description = "List all tickets accessible to the current user. Requires login.")]
    async fn list_tickets(&self) -> String {
        tracing::debug!("list_tickets tool called");

        match self.client.list_tickets().await {
            Ok(tickets) => {
                let count = tickets.as_array().map(|a| a.len()).unwrap_or(0);
                OperationResult::ok()
                    .with_message(format!("Found {} ticket(s)", count))
                    .with_field("tickets", tickets)
                    .with_field("count", Value::from(count))
                    .to_json()
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to list tickets");
                OperationResult::from_error(&e).to_json()
            }
        }
    }

    /// Get one ticket by ID.
    #[tool(description = "Get full details of a single ticket by ID. Requires login.")]
    async fn get_ticket(&self, Parameters(input): Parameters<GetTicketInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(ticket_id = %input.ticket_id, "get_ticket tool called");

        match self.client.get_ticket(&input.ticket_id).await {
            Ok(ticket) => OperationResult::ok()
                .with_field("ticket", ticket)
                .to_json(),
            Err(e) => {
                tracing::error!(error = %e, ticket_id = %input.ticket_id, "failed to get ticket");
                OperationResult::from_error(&e).to_json()
            }
        }
    }

    /// Update a ticket with only the supplied fields.
    #[tool(description = "Update a ticket's title, description, priority, status, or assignee. Only supplied fields are changed. Requires login.")]
    async fn update_ticket(&self, Parameters(input): Parameters<UpdateTicketInput>) -> String {
        let input = input.sanitize();
        tracing::debug!(ticket_id = %input.ticket_id, "update_ticket tool called");

        match self.client.update_ticket(&input).await {
            Ok(ticket) => OperationResult::ok()
                .with_message(format!("Ticket {} updated", input.ticket_id))
                .with_field("ticket", ticket)
                .to_json(),
            Err(e) => {
                tracing::error!(error = %e, ticket_id = %input.ticket_id, "failed to update ticket");
                OperationResult::from_error(&e).to_json()
            }
        }
    }

    /// Get the authenticated user's profile.
    #[tool(description = "Get the authenticated user's profile from the helpdesk API. Requires login.")]
    async fn current_user(&self) -> String {
        tracing::debug!("current_user tool called");

        match self.client.current_user().await {
            Ok(user) => OperationResult::ok().with_field("user", user).to_json(),
            Err(e) => {
                tracing::error!(error = %e, "failed to get current user");
                OperationResult::from_error(&e).to_json()
            }
        }
    }

    /// Get ticket statistics.
    #[tool(description = "Get ticket statistics from the helpdesk API. Requires login.")]
    async fn ticket_stats(&self) -> String {
        tracing::debug!("ticket_stats tool called");

        match self.client.stats().await {
            Ok(stats) => OperationResult::ok().with_field("stats", stats).to_json(),
            Err(e) => {
                tracing::error!(error = %e, "failed to get stats");
                OperationResult::from_error(&e).to_json()
            }
        }
    }
}

#[tool_handler]
impl ServerHandler for SessionServer {
    /// Returns server information for the MCP initialize handshake.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Porter (session) provides helpdesk ticket access through an \
                 in-memory login session. Use register to create an account, \
                 login to establish the session, then create_ticket, \
                 list_tickets, get_ticket, update_ticket, current_user, and \
                 ticket_stats. Use status to check connectivity and logout to \
                 clear the session. Start with 'ping' to verify connectivity."
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
    use crate::http::ApiHandle;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn server_for(uri: &str) -> SessionServer {
        SessionServer::new(SessionClient::new(ApiHandle::new(uri).unwrap()))
    }

    async fn mount_login(mock: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": "tok123"})),
            )
            .mount(mock)
            .await;
    }

    #[test]
    fn test_server_info_has_tools_capability() {
        let server = server_for("http://localhost:8081");
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.is_some());
    }

    #[test]
    fn test_ping_tool_returns_pong() {
        let server = server_for("http://localhost:8081");
        assert_eq!(server.ping(), "pong");
    }

    #[tokio::test]
    async fn test_login_tool_reports_username_not_token() {
        let mock = MockServer::start().await;
        mount_login(&mock).await;

        let server = server_for(&mock.uri());
        let input: LoginInput =
            serde_json::from_str(r#"{"username": "bob", "password": "pw"}"#).unwrap();
        let raw = server.login(Parameters(input)).await;
        let result: Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(result["success"], true);
        assert_eq!(result["username"], "bob");
        assert!(!raw.contains("tok123"));
    }

    #[tokio::test]
    async fn test_authenticated_tool_while_logged_out() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock)
            .await;

        let server = server_for(&mock.uri());
        let result: Value = serde_json::from_str(&server.list_tickets().await).unwrap();

        assert_eq!(result["success"], false);
        assert!(result["error"].as_str().unwrap().contains("not logged in"));
        assert!(result["suggestion"].as_str().unwrap().contains("login"));
    }

    #[tokio::test]
    async fn test_update_tool_with_no_fields() {
        let mock = MockServer::start().await;
        mount_login(&mock).await;

        let server = server_for(&mock.uri());
        let login: LoginInput =
            serde_json::from_str(r#"{"username": "bob", "password": "pw"}"#).unwrap();
        server.login(Parameters(login)).await;

        let input: UpdateTicketInput =
            serde_json::from_str(r#"{"ticket_id": "42"}"#).unwrap();
        let result: Value =
            serde_json::from_str(&server.update_ticket(Parameters(input)).await).unwrap();

        assert_eq!(result["success"], false);
        assert!(result["error"]
            .as_str()
            .unwrap()
            .contains("no update data provided"));
    }

    #[tokio::test]
    async fn test_logout_then_authenticated_tool_fails_again() {
        let mock = MockServer::start().await;
        mount_login(&mock).await;

        let server = server_for(&mock.uri());
        let login: LoginInput =
            serde_json::from_str(r#"{"username": "bob", "password": "pw"}"#).unwrap();
        server.login(Parameters(login)).await;

        let result: Value = serde_json::from_str(&server.logout().await).unwrap();
        assert_eq!(result["success"], true);

        // Idempotent second logout.
        let result: Value = serde_json::from_str(&server.logout().await).unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["message"], "No active session");

        let result: Value = serde_json::from_str(&server.current_user().await).unwrap();
        assert_eq!(result["success"], false);
        assert!(result["error"].as_str().unwrap().contains("not logged in"));
    }

    #[tokio::test]
    async fn test_status_reports_connectivity_and_username() {
        let mock = MockServer::start().await;
        mount_login(&mock).await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": "helpdesk"})),
            )
            .mount(&mock)
            .await;

        let server = server_for(&mock.uri());
        let login: LoginInput =
            serde_json::from_str(r#"{"username": "bob", "password": "pw"}"#).unwrap();
        server.login(Parameters(login)).await;

        let raw = server.status().await;
        let result: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["connected"], true);
        assert_eq!(result["logged_in"], true);
        assert_eq!(result["username"], "bob");
        assert!(!raw.contains("tok123"));
    }

    #[tokio::test]
    async fn test_status_reports_unreachable_api() {
        let server = server_for("http://127.0.0.1:1");
        let result: Value = serde_json::from_str(&server.status().await).unwrap();
        assert_eq!(result["success"], false);
        assert_eq!(result["connected"], false);
        assert!(result["suggestion"]
            .as_str()
            .unwrap()
            .contains("HELPDESK_API_URL"));
    }

    #[tokio::test]
    async fn test_ticket_stats_after_login() {
        let mock = MockServer::start().await;
        mount_login(&mock).await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total": 12,
                "open": 4,
                "resolved": 8
            })))
            .mount(&mock)
            .await;

        let server = server_for(&mock.uri());
        let login: LoginInput =
            serde_json::from_str(r#"{"username": "bob", "password": "pw"}"#).unwrap();
        server.login(Parameters(login)).await;

        let result: Value = serde_json::from_str(&server.ticket_stats().await).unwrap();
        assert_eq!(result["success"], true);
        assert_eq!(result["stats"]["total"], 12);
    }
}
