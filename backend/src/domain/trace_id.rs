//! Request-scoped correlation identifier.
//!
//! One unit of work runs per inbound request; the dispatcher opens a scope
//! holding a [`TraceId`] so that errors created anywhere inside the handler
//! and every log line emitted on the way can be tied back to that request.
//!
//! Tokio task-locals are not inherited by spawned tasks. Handlers never spawn
//! sub-tasks, so the scope opened by the dispatcher covers all their work.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static TRACE_ID: TraceId;
}

/// Per-request trace identifier exposed via task-local storage.
///
/// # Examples
/// ```
/// use activity_hub::domain::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let trace_id: TraceId = "00000000-0000-0000-0000-000000000000"
///     .parse()
///     .expect("valid UUID");
/// let observed = TraceId::scope(trace_id, async move { TraceId::current() }).await;
/// assert_eq!(observed, Some(trace_id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Generate a new random trace identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the current trace identifier if one is in scope.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` in scope.
    pub async fn scope<Fut>(trace_id: TraceId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }

    /// Run `fut` inside the current scope, or a fresh one when none is open.
    ///
    /// Nested dispatches (a boundary that already opened a scope) keep the
    /// outer identifier.
    pub async fn ensure_scope<Fut>(fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        match Self::current() {
            Some(_) => fut.await,
            None => Self::scope(Self::generate(), fut).await,
        }
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn current_is_none_out_of_scope() {
        assert!(TraceId::current().is_none());
    }

    #[tokio::test]
    async fn ensure_scope_opens_a_scope_when_missing() {
        let observed = TraceId::ensure_scope(async { TraceId::current() }).await;
        assert!(observed.is_some());
    }

    #[tokio::test]
    async fn ensure_scope_keeps_outer_identifier() {
        let outer = TraceId::generate();
        let observed = TraceId::scope(outer, async {
            TraceId::ensure_scope(async { TraceId::current() }).await
        })
        .await;
        assert_eq!(observed, Some(outer));
    }

    #[test]
    fn parses_hyphenated_uuids() {
        let trace_id: TraceId = Uuid::nil().to_string().parse().expect("parse uuid");
        assert_eq!(trace_id.to_string(), Uuid::nil().to_string());
    }
}
