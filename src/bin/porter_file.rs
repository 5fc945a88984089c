//! Porter (file-token) - MCP adapter for the helpdesk HTTP API.
//!
//! This binary runs as an MCP server using stdio transport. The bearer token
//! is read from a credential file written by an external OAuth2 login flow
//! and validated on every call.
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `HELPDESK_API_URL`: Base URL of the helpdesk API
//! - `HELPDESK_CREDENTIAL_FILE`: Path to the saved credential JSON
//! - `HELPDESK_IDP_ISSUER`: Identity-provider issuer URL (optional)

use anyhow::{Context, Result};
use chrono::Utc;
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::{fmt, EnvFilter};

use porter::{config, http, server, token_store};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // Initialize logging to stderr (critical for stdio transport!)
    // stdout is reserved for MCP JSON-RPC messages
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("porter=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!(
        "Starting Porter file-token MCP server v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration from environment
    let config = config::Config::from_env().context("Failed to load configuration")?;
    let credential_path = config
        .require_credential_path()
        .context("Failed to load configuration")?
        .clone();

    tracing::debug!(
        api_url = %config.api_base_url,
        credential_file = %credential_path.display(),
        "Configuration loaded"
    );

    let api = http::ApiHandle::new(&config.api_base_url).context("Failed to create API client")?;
    let idp = match &config.idp_issuer_url {
        Some(issuer) => {
            Some(http::ApiHandle::new(issuer).context("Failed to create identity-provider client")?)
        }
        None => None,
    };

    // Report credential state at startup; an absent or expired credential
    // is not fatal, the file may be refreshed while the server runs.
    let store = token_store::TokenStore::new(credential_path);
    let (token, message) = store.token(Utc::now().timestamp());
    if token.is_some() {
        tracing::info!("{}", message);
    } else {
        tracing::warn!("{}", message);
    }

    let server = server::FileTokenServer::new(store, api, idp);

    tracing::info!("Server initialized, starting stdio transport");

    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("serving error: {:?}", e);
        })
        .context("Failed to start server")?;

    tracing::info!("Server running, waiting for requests");

    service
        .waiting()
        .await
        .context("Server error during operation")?;

    tracing::info!("Server shutting down");

    Ok(())
}
