//! # Porter
//!
//! Porter is a pair of MCP (Model Context Protocol) adapters for a helpdesk
//! HTTP API, enabling AI assistants to create and manage support tickets
//! through natural language.
//!
//! Two binaries share this library:
//!
//! - **`porter-file`** — resolves the bearer token from a credential file
//!   written by an external OAuth2 login flow (e.g. Keycloak). The file is
//!   re-read on every call; expiry is validated before any network access.
//! - **`porter-session`** — holds an in-memory session obtained via the
//!   `login` tool and attaches it to subsequent ticket/user/stat calls.
//!
//! ## Architecture
//!
//! - [`config`] - Configuration loading from environment variables
//! - [`error`] - Unified error type with local/transport/remote taxonomy
//! - [`http`] - Scoped HTTP request wrapper over the helpdesk API
//! - [`token_store`] - Credential-file reader and expiry validation
//! - [`session_client`] - Session slot and authenticated API operations
//! - [`models`] - Credential record and uniform operation result types
//! - [`server`] - MCP server implementations with tool routing
//! - [`tools`] - Tool input parameter structs
//!
//! ## Configuration
//!
//! - `HELPDESK_API_URL`: Base URL of the helpdesk API (required)
//! - `HELPDESK_CREDENTIAL_FILE`: Path to the saved credential JSON
//!   (required by `porter-file`)
//! - `HELPDESK_IDP_ISSUER`: Identity-provider issuer URL for userinfo
//!   cross-checks (optional, `porter-file` only)
//! - `RUST_LOG`: Log level (e.g., `porter=debug`)
//!
//! ## Result contract
//!
//! Every tool returns a JSON-serialized [`models::OperationResult`]:
//! `{ "success": bool, ... }` with a domain payload on success and an
//! `error` string plus optional `suggestion`/`instructions` on failure.
//! No error path terminates the host process.
//!
//! ## Security Considerations
//!
//! Bearer tokens are held only in memory (session variant) or read from the
//! credential file (file variant) and are:
//! - Never logged at any log level
//! - Never included in any tool response (status reports the username only)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod server;
pub mod session_client;
pub mod token_store;
pub mod tools;
