//! Strategy traits and the sleep seam.

use super::error::RetryInterrupted;
use std::time::Duration;

/// Per-invocation retry state.
///
/// Obtained from a [`RetryStrategyFactory`] at the start of every top-level
/// call and dropped when the call returns. Not meant to be shared between
/// threads or reused for a second operation.
pub trait RetryStrategy {
    /// Whether another retry is allowed. Pure; safe to poll repeatedly.
    fn can_retry(&self) -> bool;

    /// Records one retry and blocks until it may start.
    fn before_retry(&mut self) -> Result<(), RetryInterrupted>;

    /// Retries recorded so far (the first attempt is not a retry).
    fn retry_count(&self) -> u32;
}

/// Stateless source of fresh strategies. Shareable across threads.
pub trait RetryStrategyFactory: Send + Sync {
    type Strategy: RetryStrategy;

    /// A strategy with zero retries recorded.
    fn new_instance(&self) -> Self::Strategy;
}

/// Blocks the calling thread between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> Result<(), RetryInterrupted>;
}

/// Sleeps with `std::thread::sleep`; never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) -> Result<(), RetryInterrupted> {
        std::thread::sleep(duration);
        Ok(())
    }
}
