//! Correlation identifier threaded through a request.
//!
//! The middleware generates one [`TraceId`] per request and scopes it into
//! task-local storage; error payloads and log lines pick it up via
//! [`TraceId::current`] without parameter threading. Task-locals do not
//! cross `spawn` boundaries, so re-wrap detached work in [`TraceId::scope`]
//! when the correlation matters there.

use std::future::Future;

use tokio::task_local;
use uuid::Uuid;

/// Response header carrying the request's trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static ACTIVE_TRACE: TraceId;
}

/// Per-request correlation id, a random UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The trace id in scope for the current task, when one is set.
    #[must_use]
    pub fn current() -> Option<Self> {
        ACTIVE_TRACE.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the in-scope identifier.
    pub async fn scope<Fut>(trace_id: TraceId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        ACTIVE_TRACE.scope(trace_id, fut).await
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Uuid>().map(Self)
    }
}
