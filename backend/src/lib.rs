//! Activities and social core: commands and queries dispatched through a
//! mediator, guarded by the activity host policy, over swappable ports.

pub mod app;
pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use app::{AppError, Collaborators, InMemoryApp, build_pipeline};
