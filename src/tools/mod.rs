//! MCP tool input types for the Porter adapters.

mod inputs;

pub use inputs::*;
