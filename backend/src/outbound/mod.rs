//! Outbound adapters implementing domain ports.
//!
//! - **memory**: process-local unit of work, identity, and photo storage
//! - **token**: signed bearer tokens via `jsonwebtoken`
//!
//! Adapters translate between domain types and their backing
//! representation. They contain no business logic.

pub mod memory;
pub mod token;
