//! Retry loop: run an operation until it succeeds or the strategy says stop.

use super::error::RetryInterrupted;
use super::strategy::{RetryStrategy, RetryStrategyFactory};

/// Runs `operation` until it returns `Ok`, retrying under a fresh strategy
/// from `factory`.
///
/// A successful first attempt never consults the strategy. When no retry is
/// left, the last operation error is returned unchanged. If the wait before a
/// retry fails, that failure is converted into `E` and returned without
/// another attempt.
pub fn call<S, F, T, E>(factory: &S, mut operation: F) -> Result<T, E>
where
    S: RetryStrategyFactory + ?Sized,
    F: FnMut() -> Result<T, E>,
    E: From<RetryInterrupted>,
{
    let mut strategy = factory.new_instance();
    let mut attempt = 1u32;
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !strategy.can_retry() {
                    tracing::debug!(attempt, "attempt failed, no retries left");
                    return Err(e);
                }
                tracing::debug!(attempt, "attempt failed, will retry");
                strategy.before_retry()?;
                attempt = attempt.saturating_add(1);
            }
        }
    }
}

/// [`call`] for operations that produce no value.
pub fn run<S, F, E>(factory: &S, operation: F) -> Result<(), E>
where
    S: RetryStrategyFactory + ?Sized,
    F: FnMut() -> Result<(), E>,
    E: From<RetryInterrupted>,
{
    call(factory, operation)
}
