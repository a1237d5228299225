//! Query instrumentation hooks
//!
//! A [`Hook`] carries two optional callback slots invoked when a query
//! begins and completes. State that must cross from `before` to `after`
//! (currently just the start instant) travels in a per-call
//! [`QueryContext`], so one hook instance can observe any number of
//! concurrent queries without the durations bleeding into each other.

use crate::error::Result;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::Span;

/// Per-call state created when a query starts and handed to the completion
/// callback. Owned by a single query invocation, never shared.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext {
    started_at: Instant,
}

impl QueryContext {
    pub(crate) fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }

    /// Time elapsed since the query started
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// A completed (or failed) query execution as seen by the hooks.
#[derive(Debug, Clone)]
pub struct QueryEvent {
    /// Formatted query text
    pub query: String,
    /// Bound parameters, rendered for diagnostics
    pub params: Vec<String>,
    /// Execution attempt; this crate has no retry layer, so always 1
    pub attempt: u32,
    /// Execution error message, when the query failed
    pub error: Option<String>,
}

impl QueryEvent {
    pub(crate) fn new(query: &str, params: Vec<String>) -> Self {
        Self {
            query: query.to_string(),
            params,
            attempt: 1,
            error: None,
        }
    }
}

/// Callback invoked when a query begins; may transform the per-call context
/// or abort the query by returning an error.
pub type BeforeQuery = Box<dyn Fn(QueryContext, &QueryEvent) -> Result<QueryContext> + Send + Sync>;

/// Callback invoked when a query completes; receives the completed event
/// and the context produced by the `before` side.
pub type AfterQuery = Box<dyn Fn(&QueryContext, &QueryEvent) -> Result<()> + Send + Sync>;

/// Query instrumentation hook with optional `before`/`after` slots.
///
/// An unset slot makes the hook a no-op observer for that side: the query
/// and its error, if any, flow through unchanged.
#[derive(Default)]
pub struct Hook {
    pub before: Option<BeforeQuery>,
    pub after: Option<AfterQuery>,
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("before", &self.before.as_ref().map(|_| "…"))
            .field("after", &self.after.as_ref().map(|_| "…"))
            .finish()
    }
}

impl Hook {
    /// Hook installed in debug mode: logs every query with its duration,
    /// parameters, attempt count and error through the given span.
    pub fn debug(logger: Span) -> Self {
        Self {
            before: None,
            after: Some(Box::new(move |ctx, event| {
                tracing::debug!(
                    parent: &logger,
                    query = %event.query,
                    query_time = ?ctx.elapsed(),
                    params = ?event.params,
                    attempt = event.attempt,
                    error = event.error.as_deref().unwrap_or(""),
                    "pg query"
                );
                Ok(())
            })),
        }
    }

    pub(crate) fn before_query(&self, ctx: QueryContext, event: &QueryEvent) -> Result<QueryContext> {
        match &self.before {
            Some(before) => before(ctx, event),
            None => Ok(ctx),
        }
    }

    pub(crate) fn after_query(&self, ctx: &QueryContext, event: &QueryEvent) -> Result<()> {
        match &self.after {
            Some(after) => after(ctx, event),
            None => Ok(()),
        }
    }
}
