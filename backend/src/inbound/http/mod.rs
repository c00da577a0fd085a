//! HTTP boundary helpers: bearer token extraction and error rendering.
//! Route registration belongs to the hosting service.

pub mod caller;
pub mod error;

pub use caller::{BearerCaller, caller_from_request};
pub use error::{TRACE_ID_HEADER, dispatch_error_body};
