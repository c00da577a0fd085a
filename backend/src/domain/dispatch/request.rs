//! Typed requests and the handler contract.

use std::any::TypeId;

use async_trait::async_trait;

use crate::domain::{ActivityId, Caller, Error, Username};

/// A command or query routed through the mediator.
pub trait Request: Send + 'static {
    type Response: Send + 'static;

    /// Stable name used in logs and configuration errors.
    const NAME: &'static str;

    /// Activity whose host alone may issue this request.
    fn host_activity(&self) -> Option<ActivityId> {
        None
    }
}

/// Per-request ambient data handed to every handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub caller: Caller,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(username: Username) -> Self {
        Self {
            caller: Caller::authenticated(username),
        }
    }
}

/// Handles exactly one request type.
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync {
    async fn handle(&self, context: &RequestContext, request: R) -> Result<R::Response, Error>;
}

/// Identifies a request type for startup validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub(crate) type_id: TypeId,
    pub name: &'static str,
}

impl RequestDescriptor {
    pub fn of<R: Request>() -> Self {
        Self {
            type_id: TypeId::of::<R>(),
            name: R::NAME,
        }
    }
}
