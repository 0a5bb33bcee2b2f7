//! Session-scoped context: correlation ids and cancellation.
//!
//! Cancellation is hierarchical. A form session owns the root token; every
//! pending debounce timer runs under a child token so that superseding a
//! value cancels only that timer, while shutting the session down cancels
//! everything beneath it.

use crate::{ErrorCode, ErrorEnvelope, Result};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;

/// Identifier threaded through log events for one session or request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(Arc<str>);

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(1);
static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(1);

impl CorrelationId {
    /// Parse a caller-supplied id. Surrounding whitespace is dropped.
    pub fn parse(value: impl AsRef<str>) -> Result<Self> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ErrorEnvelope::expected(
                ErrorCode::invalid_input(),
                "correlationId must be non-empty",
            ));
        }
        Ok(Self(Arc::from(trimmed)))
    }

    /// Next `form_<n>` id, unique within the process.
    #[must_use]
    pub fn new_session_id() -> Self {
        Self::next(&SESSION_COUNTER, "form")
    }

    /// Next `req_<n>` id, unique within the process.
    #[must_use]
    pub fn new_request_id() -> Self {
        Self::next(&REQUEST_COUNTER, "req")
    }

    fn next(counter: &AtomicU64, prefix: &str) -> Self {
        let n = counter.fetch_add(1, Ordering::Relaxed);
        Self(Arc::from(format!("{prefix}_{n}")))
    }

    /// Borrow the id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Correlation id plus cancellation, passed to every port call.
#[derive(Debug, Clone)]
pub struct RequestContext {
    correlation_id: CorrelationId,
    cancellation: CancellationToken,
}

impl RequestContext {
    /// Context with a fresh root token.
    #[must_use]
    pub fn new(correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id,
            cancellation: CancellationToken::new(),
        }
    }

    /// Context for a new form session (`form_<n>`).
    #[must_use]
    pub fn new_session() -> Self {
        Self::new(CorrelationId::new_session_id())
    }

    /// Context for a one-off request (`req_<n>`).
    #[must_use]
    pub fn new_request() -> Self {
        Self::new(CorrelationId::new_request_id())
    }

    /// Same correlation id, child token: cancelling the child leaves `self`
    /// untouched, cancelling `self` cancels the child.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            correlation_id: self.correlation_id.clone(),
            cancellation: self.cancellation.child_token(),
        }
    }

    /// The correlation id.
    #[must_use]
    pub const fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// A handle to this context's token.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Returns true once cancelled (directly or through a parent).
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Cancel this context and its children.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Resolves when the context is cancelled.
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await;
    }

    /// Fails with `core:cancelled` when the context is already cancelled.
    pub fn ensure_not_cancelled(&self, operation: &'static str) -> Result<()> {
        if self.is_cancelled() {
            return Err(cancelled_error(operation));
        }
        Ok(())
    }
}

pub(crate) fn cancelled_error(operation: &'static str) -> ErrorEnvelope {
    ErrorEnvelope::cancelled("operation cancelled").with_metadata("operation", operation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_ids_are_prefixed_and_unique() {
        let first = CorrelationId::new_session_id();
        let second = CorrelationId::new_session_id();
        assert!(first.as_str().starts_with("form_"));
        assert_ne!(first, second);
        assert!(CorrelationId::new_request_id().as_str().starts_with("req_"));
    }

    #[test]
    fn parse_rejects_blank_ids() {
        assert!(CorrelationId::parse("   ").is_err());
        let parsed = CorrelationId::parse(" gate-m72 ").map(|id| id.to_string());
        assert_eq!(parsed.ok().as_deref(), Some("gate-m72"));
    }

    #[test]
    fn child_cancellation_does_not_reach_parent() {
        let session = RequestContext::new_session();
        let timer = session.child();
        timer.cancel();
        assert!(timer.is_cancelled());
        assert!(!session.is_cancelled());
        assert_eq!(timer.correlation_id(), session.correlation_id());
    }

    #[test]
    fn parent_cancellation_reaches_children() {
        let session = RequestContext::new_session();
        let timer = session.child();
        session.cancel();
        assert!(timer.is_cancelled());
        let error = timer.ensure_not_cancelled("form.username.debounce");
        assert!(error.as_ref().is_err_and(ErrorEnvelope::is_cancelled));
    }

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let ctx = RequestContext::new_request();
        let waiter = ctx.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });
        ctx.cancel();
        assert!(handle.await.is_ok());
    }
}
