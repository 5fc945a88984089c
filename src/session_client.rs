//! Session-based helpdesk API client.
//!
//! The client holds at most one authenticated session in a slot guarded by
//! an async `RwLock`. The slot is set by a successful `login`, left untouched
//! by a failed one, and cleared unconditionally by `logout`. Every
//! authenticated operation checks the slot first and fails fast with
//! `PorterError::NotLoggedIn` before any network call.

use reqwest::Method;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::PorterError;
use crate::http::ApiHandle;
use crate::models::{LoginResponse, Session};
use crate::tools::{CreateTicketInput, UpdateTicketInput};

/// Helpdesk API client holding one in-memory session slot.
pub struct SessionClient {
    api: ApiHandle,
    session: RwLock<Option<Session>>,
}

impl SessionClient {
    /// Creates a client with an empty session slot.
    pub fn new(api: ApiHandle) -> Self {
        Self {
            api,
            session: RwLock::new(None),
        }
    }

    /// Returns the API handle.
    pub fn api(&self) -> &ApiHandle {
        &self.api
    }

    /// Returns a clone of the current session, if logged in.
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Returns the current session or fails fast when logged out.
    ///
    /// No network call is made on the failure path.
    async fn require_session(&self) -> Result<Session, PorterError> {
        self.session
            .read()
            .await
            .clone()
            .ok_or(PorterError::NotLoggedIn)
    }

    /// Validates that a ticket ID is a numeric string before it is
    /// interpolated into a URL path.
    fn validate_ticket_id(id: &str) -> Result<(), PorterError> {
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PorterError::validation(format!(
                "ticket_id must be a numeric string, got: {:?}",
                id.chars().take(50).collect::<String>()
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Registers a new account via `POST /register`.
    ///
    /// Stateless: the session slot is never touched.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<Value, PorterError> {
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
            "role": role.unwrap_or("user"),
        });
        self.api.scope().post("/register", &body).await
    }

    /// Logs in via `POST /login`.
    ///
    /// On success the session slot is atomically replaced with the new
    /// `(token, username)` pair. On failure the prior session is untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, PorterError> {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });
        let response = self.api.scope().post("/login", &body).await?;
        let login: LoginResponse = serde_json::from_value(response)?;

        let session = Session {
            token: login.access_token,
            username: username.to_string(),
        };

        *self.session.write().await = Some(session.clone());
        tracing::info!(username = %username, "session established");

        Ok(session)
    }

    /// Clears the session slot unconditionally. Idempotent.
    ///
    /// Returns the username of the session that was cleared, if any.
    pub async fn logout(&self) -> Option<String> {
        let previous = self.session.write().await.take();
        if let Some(ref session) = previous {
            tracing::info!(username = %session.username, "session cleared");
        }
        previous.map(|s| s.username)
    }

    /// Probes `GET /` without authentication.
    ///
    /// Used by the status tool to report connectivity.
    pub async fn probe(&self) -> Result<Value, PorterError> {
        self.api.scope().get("/").await
    }

    // ========================================================================
    // Authenticated operations
    // ========================================================================

    /// Creates a ticket via `POST /tickets`.
    pub async fn create_ticket(&self, input: &CreateTicketInput) -> Result<Value, PorterError> {
        let session = self.require_session().await?;
        self.api
            .scope()
            .with_bearer(&session.token)
            .post("/tickets", &input.to_payload())
            .await
    }

    /// Lists tickets via `GET /tickets`.
    pub async fn list_tickets(&self) -> Result<Value, PorterError> {
        let session = self.require_session().await?;
        self.api
            .scope()
            .with_bearer(&session.token)
            .get("/tickets")
            .await
    }

    /// Gets one ticket via `GET /tickets/{id}`.
    pub async fn get_ticket(&self, ticket_id: &str) -> Result<Value, PorterError> {
        let session = self.require_session().await?;
        Self::validate_ticket_id(ticket_id)?;
        self.api
            .scope()
            .with_bearer(&session.token)
            .get(&format!("/tickets/{}", ticket_id))
            .await
    }

    /// Updates a ticket via `PUT /tickets/{id}`.
    ///
    /// Only explicitly supplied fields are sent. Zero supplied fields fails
    /// locally with `PorterError::NoUpdateFields`, no network call.
    pub async fn update_ticket(&self, input: &UpdateTicketInput) -> Result<Value, PorterError> {
        let session = self.require_session().await?;
        if !input.has_updates() {
            return Err(PorterError::NoUpdateFields);
        }
        Self::validate_ticket_id(&input.ticket_id)?;
        self.api
            .scope()
            .with_bearer(&session.token)
            .request(
                Method::PUT,
                &format!("/tickets/{}", input.ticket_id),
                Some(&input.to_patch()),
            )
            .await
    }

    /// Gets the authenticated user via `GET /users/me`.
    pub async fn current_user(&self) -> Result<Value, PorterError> {
        let session = self.require_session().await?;
        self.api
            .scope()
            .with_bearer(&session.token)
            .get("/users/me")
            .await
    }

    /// Gets ticket statistics via `GET /stats`.
    pub async fn stats(&self) -> Result<Value, PorterError> {
        let session = self.require_session().await?;
        self.api
            .scope()
            .with_bearer(&session.token)
            .get("/stats")
            .await
    }
}
