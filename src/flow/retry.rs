use std::future::Future;
use std::time::Duration;

use crate::errors::BillDroidResult;

/// Result of one polling attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    Ready(T),
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    Success { value: T, attempts: u32 },
    Timeout { attempts: u32 },
}

/// Runs `op` up to `max_attempts` times until it reports `Ready`.
///
/// Attempts are numbered from 1. After a `Pending` attempt that is not the
/// last, sleeps `interval(attempt)`. An `Err` from `op` ends the loop at once:
/// only "not there yet" is retried, transport failures are not.
pub async fn with_retry<T, F, Fut, I>(
    max_attempts: u32,
    interval: I,
    mut op: F,
) -> BillDroidResult<RetryOutcome<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = BillDroidResult<Attempt<T>>>,
    I: Fn(u32) -> Duration,
{
    for attempt in 1..=max_attempts {
        if let Attempt::Ready(value) = op(attempt).await? {
            return Ok(RetryOutcome::Success {
                value,
                attempts: attempt,
            });
        }
        if attempt < max_attempts {
            let pause = interval(attempt);
            tracing::trace!(attempt, max_attempts, pause_ms = pause.as_millis() as u64, "retrying");
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }
    }
    Ok(RetryOutcome::Timeout {
        attempts: max_attempts,
    })
}
