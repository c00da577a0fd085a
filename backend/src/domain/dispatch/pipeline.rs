//! Entry point the boundary layer calls for every decoded request.

use std::sync::Arc;

use tracing::{Instrument, info_span, warn};

use super::{DispatchError, Mediator, Request, RequestContext};
use crate::domain::TraceId;
use crate::domain::authorization::ActivityHostPolicy;

/// Runs the host policy for host-restricted requests, then dispatches.
#[derive(Clone)]
pub struct RequestPipeline {
    mediator: Mediator,
    policy: Arc<dyn ActivityHostPolicy>,
}

impl RequestPipeline {
    pub fn new(mediator: Mediator, policy: Arc<dyn ActivityHostPolicy>) -> Self {
        Self { mediator, policy }
    }

    /// Dispatch `request` inside a trace scope.
    ///
    /// A denied policy check never reaches the handler.
    pub async fn send<R: Request>(
        &self,
        context: &RequestContext,
        request: R,
    ) -> Result<R::Response, DispatchError> {
        TraceId::ensure_scope(async move {
            let trace_id = TraceId::current().map(|id| id.to_string());
            let span = info_span!("dispatch", request = R::NAME, trace_id = trace_id.as_deref());
            async move {
                if let Some(activity_id) = request.host_activity() {
                    if let Err(denied) =
                        self.policy.authorize(&context.caller, &activity_id).await
                    {
                        warn!(%activity_id, error = %denied, "host policy rejected request");
                        return Err(denied);
                    }
                }
                self.mediator
                    .send(context, request)
                    .await
                    .map_err(DispatchError::Failed)
            }
            .instrument(span)
            .await
        })
        .await
    }
}
