//! Data models for the Porter adapters.
//!
//! This module contains the persisted credential record, the in-memory
//! session, and the uniform operation result every tool returns.

mod credential;
mod result;
mod session;

pub use credential::*;
pub use result::*;
pub use session::*;
