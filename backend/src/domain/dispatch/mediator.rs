//! Type-indexed handler registry.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use tracing::debug;

use super::{DispatchConfigError, Request, RequestContext, RequestDescriptor, RequestHandler};
use crate::domain::Error;

struct Registration {
    name: &'static str,
    // Always an `Arc<dyn RequestHandler<R>>` for the keyed `R`.
    handler: Box<dyn Any + Send + Sync>,
}

/// Collects one handler per request type.
#[derive(Default)]
pub struct MediatorBuilder {
    handlers: HashMap<TypeId, Registration>,
}

impl MediatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for `R`. A second registration for the same
    /// type is rejected.
    pub fn register<R: Request>(
        mut self,
        handler: Arc<dyn RequestHandler<R>>,
    ) -> Result<Self, DispatchConfigError> {
        match self.handlers.entry(TypeId::of::<R>()) {
            Entry::Occupied(_) => Err(DispatchConfigError::DuplicateHandler { request: R::NAME }),
            Entry::Vacant(slot) => {
                slot.insert(Registration {
                    name: R::NAME,
                    handler: Box::new(handler),
                });
                Ok(self)
            }
        }
    }

    /// Finish registration, verifying every catalogued request has a handler.
    pub fn build(self, catalogue: &[RequestDescriptor]) -> Result<Mediator, DispatchConfigError> {
        if let Some(missing) = catalogue
            .iter()
            .find(|descriptor| !self.handlers.contains_key(&descriptor.type_id))
        {
            return Err(DispatchConfigError::MissingHandler {
                request: missing.name,
            });
        }
        debug!(
            handlers = self.handlers.len(),
            requests = ?self.handlers.values().map(|r| r.name).collect::<Vec<_>>(),
            "mediator built"
        );
        Ok(Mediator {
            handlers: Arc::new(self.handlers),
        })
    }
}

/// Routes a request to its registered handler.
#[derive(Clone)]
pub struct Mediator {
    handlers: Arc<HashMap<TypeId, Registration>>,
}

impl Mediator {
    pub async fn send<R: Request>(
        &self,
        context: &RequestContext,
        request: R,
    ) -> Result<R::Response, Error> {
        let handler = self.handler::<R>()?;
        handler.handle(context, request).await
    }

    fn handler<R: Request>(&self) -> Result<Arc<dyn RequestHandler<R>>, Error> {
        self.handlers
            .get(&TypeId::of::<R>())
            .and_then(|registration| {
                registration
                    .handler
                    .downcast_ref::<Arc<dyn RequestHandler<R>>>()
            })
            .cloned()
            .ok_or_else(|| Error::internal(format!("no handler registered for {}", R::NAME)))
    }
}
