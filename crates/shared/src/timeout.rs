//! Deadline helper that also observes context cancellation.

use crate::concurrency::cancelled_error;
use crate::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::future::Future;
use std::time::Duration;

/// Run `fut` to completion unless the deadline passes or `ctx` is cancelled.
///
/// A deadline miss is reported as a retriable `core:timeout`.
pub async fn timeout_with_context<T, F>(
    ctx: &RequestContext,
    timeout: Duration,
    operation: &'static str,
    fut: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    ctx.ensure_not_cancelled(operation)?;

    tokio::select! {
        () = ctx.cancelled() => Err(cancelled_error(operation)),
        outcome = tokio::time::timeout(timeout, fut) => match outcome {
            Ok(result) => result,
            Err(_elapsed) => Err(ErrorEnvelope::unexpected(
                ErrorCode::timeout(),
                format!("{operation} exceeded {}ms", timeout.as_millis()),
                ErrorClass::Retriable,
            )
            .with_metadata("operation", operation)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn slow_future_times_out_as_retriable() {
        let ctx = RequestContext::new_request();
        let slow = async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok::<_, ErrorEnvelope>(())
        };

        let result = timeout_with_context(&ctx, Duration::from_millis(50), "lookup", slow).await;
        let Err(error) = result else {
            unreachable!("a 500ms future must miss a 50ms deadline");
        };
        assert_eq!(error.code, ErrorCode::timeout());
        assert!(error.is_retriable());
    }

    #[tokio::test(start_paused = true)]
    async fn fast_future_passes_through() -> Result<()> {
        let ctx = RequestContext::new_request();
        let value = timeout_with_context(&ctx, Duration::from_secs(1), "lookup", async {
            Ok::<_, ErrorEnvelope>(7)
        })
        .await?;
        assert_eq!(value, 7);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_wins_over_pending_future() {
        let ctx = RequestContext::new_request();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result = timeout_with_context(&ctx, Duration::from_secs(5), "lookup", async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok::<_, ErrorEnvelope>(())
        })
        .await;
        assert!(result.is_err_and(|error| error.is_cancelled()));
    }
}
