//! Retry with exponential backoff for collaborator calls.

use crate::concurrency::cancelled_error;
use crate::{ErrorEnvelope, RequestContext, Result};
use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Backoff settings for [`retry_async`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. `0` and `1` both mean "no retry".
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after every failure.
    pub base_delay_ms: u64,
    /// Upper bound for any single delay.
    pub max_delay_ms: u64,
    /// Symmetric jitter applied to each delay, in percent (0..=100).
    pub jitter_ratio_pct: u32,
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 0,
            max_delay_ms: 0,
            jitter_ratio_pct: 0,
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    #[must_use]
    pub fn delay_after(self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(20);
        let exponential = self.base_delay_ms.saturating_mul(1_u64 << shift);
        let capped = exponential.min(self.max_delay_ms);

        let jitter_pct = u64::from(self.jitter_ratio_pct.min(100));
        if jitter_pct == 0 || capped == 0 {
            return Duration::from_millis(capped);
        }

        // Spread the delay over [capped - range, capped + range], clamped to the cap.
        let range = capped.saturating_mul(jitter_pct) / 100;
        let span = range.saturating_mul(2).saturating_add(1);
        let offset = jitter_seed(attempt) % span;
        let jittered = capped.saturating_sub(range).saturating_add(offset);
        Duration::from_millis(jittered.min(self.max_delay_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 1_000,
            jitter_ratio_pct: 0,
        }
    }
}

fn jitter_seed(attempt: u32) -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::from(elapsed.subsec_nanos()));
    nanos ^ u64::from(attempt).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Run `op` until it succeeds, fails with a non-retriable error, or the
/// policy runs out of attempts. Backoff sleeps observe `ctx` cancellation.
pub async fn retry_async<T, F, Fut>(
    ctx: &RequestContext,
    policy: RetryPolicy,
    operation: &'static str,
    op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_async_with_observer(ctx, policy, operation, op, |_, _| {}).await
}

/// [`retry_async`] with a hook called before each backoff sleep.
pub async fn retry_async_with_observer<T, F, Fut, Obs>(
    ctx: &RequestContext,
    policy: RetryPolicy,
    operation: &'static str,
    mut op: F,
    mut on_retry: Obs,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    Obs: FnMut(u32, &ErrorEnvelope),
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0_u32;

    loop {
        attempt = attempt.saturating_add(1);
        ctx.ensure_not_cancelled(operation)?;

        let error = match op().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };
        if !error.is_retriable() || attempt >= max_attempts {
            return Err(error);
        }

        on_retry(attempt, &error);
        tokio::select! {
            () = ctx.cancelled() => return Err(cancelled_error(operation)),
            () = tokio::time::sleep(policy.delay_after(attempt)) => {},
        }
    }
}
