//! Command/query dispatch.
//!
//! Every decoded request travels through [`RequestPipeline::send`]: a trace
//! scope is opened, host-restricted requests are checked against the
//! activity host policy, and the [`Mediator`] hands the request to the one
//! handler registered for its type. Missing handlers are detected when the
//! mediator is built, not when a request arrives.

mod mediator;
mod pipeline;
mod request;

pub use mediator::{Mediator, MediatorBuilder};
pub use pipeline::RequestPipeline;
pub use request::{Request, RequestContext, RequestDescriptor, RequestHandler};

use crate::domain::Error;
use crate::domain::authorization::PolicyDenial;

/// Wiring mistakes caught while building the mediator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchConfigError {
    #[error("more than one handler registered for {request}")]
    DuplicateHandler { request: &'static str },
    #[error("no handler registered for {request}")]
    MissingHandler { request: &'static str },
}

/// Outcome of a dispatch that did not produce a response.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    /// The host policy rejected the caller before any handler ran.
    #[error("request denied: {0}")]
    Denied(#[from] PolicyDenial),
    /// The handler, or the policy's own lookups, failed.
    #[error(transparent)]
    Failed(#[from] Error),
}
