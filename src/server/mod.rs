//! MCP server implementations for the Porter adapters.
//!
//! Each adapter binary runs one of the servers defined here. Both expose
//! their operations as MCP tools via rmcp's tool router and return the
//! uniform [`crate::models::OperationResult`] serialized as JSON.

mod file_token;
mod session;

pub use file_token::FileTokenServer;
pub use session::SessionServer;
