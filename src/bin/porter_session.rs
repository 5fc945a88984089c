//! Porter (session) - MCP adapter for the helpdesk HTTP API.
//!
//! This binary runs as an MCP server using stdio transport. A login tool
//! establishes an in-memory session whose token is attached to all
//! subsequent ticket/user/stat operations until logout.
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `HELPDESK_API_URL`: Base URL of the helpdesk API

use anyhow::{Context, Result};
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::{fmt, EnvFilter};

use porter::{config, http, server, session_client};

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
        "Starting Porter session MCP server v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration from environment
    let config = config::Config::from_env().context("Failed to load configuration")?;

    tracing::debug!(api_url = %config.api_base_url, "Configuration loaded");

    let api = http::ApiHandle::new(&config.api_base_url).context("Failed to create API client")?;
    let client = session_client::SessionClient::new(api);

    // Probe the API before starting; an unreachable server is not fatal,
    // it may become available later.
    tracing::info!("Probing helpdesk API...");
    if let Err(e) = client.probe().await {
        tracing::warn!(
            error = %e,
            "Helpdesk API is not reachable. The server will start but tools \
             will fail until the API is available."
        );
    }

    let server = server::SessionServer::new(client);

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
