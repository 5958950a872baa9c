use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::error::{RetryConfigError, RetryInterrupted};
use super::strategy::{RetryStrategy, RetryStrategyFactory, Sleeper, ThreadSleeper};

/// How long to wait before each retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Every retry waits the base sleep.
    Fixed,
    /// Retry n waits `base * 2^(n-1)`, capped at `max_sleep`.
    Exponential { max_sleep: Duration },
}

impl Backoff {
    /// Sleep before retry number `retry` (1-based).
    pub fn sleep_for(&self, base: Duration, retry: u32) -> Duration {
        match self {
            Backoff::Fixed => base,
            Backoff::Exponential { max_sleep } => {
                let exp = 1u32 << retry.saturating_sub(1).min(8);
                base.saturating_mul(exp).min(*max_sleep)
            }
        }
    }
}

/// Validated retry parameters; hands out a fresh [`BackoffStrategy`] per call.
///
/// `max_retry_count = N` allows at most `N + 1` attempts.
#[derive(Clone)]
pub struct RetryPolicy {
    max_retry_count: u32,
    before_retry_sleep: Duration,
    backoff: Backoff,
    sleeper: Arc<dyn Sleeper>,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retry_count", &self.max_retry_count)
            .field("before_retry_sleep", &self.before_retry_sleep)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retry_count: 3,
            before_retry_sleep: Duration::from_millis(500),
            backoff: Backoff::Fixed,
            sleeper: Arc::new(ThreadSleeper),
        }
    }
}

impl RetryPolicy {
    /// Smallest accepted before-retry sleep.
    pub const MIN_SLEEP: Duration = Duration::from_millis(1);

    /// Fixed sleep between retries.
    pub fn new(max_retry_count: u32, before_retry_sleep: Duration) -> Result<Self, RetryConfigError> {
        Self::with_backoff(max_retry_count, before_retry_sleep, Backoff::Fixed)
    }

    /// Doubling sleep between retries, capped at `max_sleep`.
    pub fn exponential(
        max_retry_count: u32,
        before_retry_sleep: Duration,
        max_sleep: Duration,
    ) -> Result<Self, RetryConfigError> {
        Self::with_backoff(
            max_retry_count,
            before_retry_sleep,
            Backoff::Exponential { max_sleep },
        )
    }

    pub fn with_backoff(
        max_retry_count: u32,
        before_retry_sleep: Duration,
        backoff: Backoff,
    ) -> Result<Self, RetryConfigError> {
        if before_retry_sleep < Self::MIN_SLEEP {
            return Err(RetryConfigError::SleepTooShort(before_retry_sleep));
        }
        if let Backoff::Exponential { max_sleep } = backoff {
            if max_sleep < before_retry_sleep {
                return Err(RetryConfigError::MaxSleepBelowBase {
                    base: before_retry_sleep,
                    max: max_sleep,
                });
            }
        }
        Ok(Self {
            max_retry_count,
            before_retry_sleep,
            backoff,
            sleeper: Arc::new(ThreadSleeper),
        })
    }

    /// Replace the thread sleeper (tests, or callers that need an interruptible wait).
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn max_retry_count(&self) -> u32 {
        self.max_retry_count
    }

    pub fn before_retry_sleep(&self) -> Duration {
        self.before_retry_sleep
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }
}

impl RetryStrategyFactory for RetryPolicy {
    type Strategy = BackoffStrategy;

    fn new_instance(&self) -> BackoffStrategy {
        BackoffStrategy {
            max_retry_count: self.max_retry_count,
            before_retry_sleep: self.before_retry_sleep,
            backoff: self.backoff,
            sleeper: Arc::clone(&self.sleeper),
            retry_count: 0,
        }
    }
}

/// Strategy produced by [`RetryPolicy`].
pub struct BackoffStrategy {
    max_retry_count: u32,
    before_retry_sleep: Duration,
    backoff: Backoff,
    sleeper: Arc<dyn Sleeper>,
    retry_count: u32,
}

impl fmt::Debug for BackoffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackoffStrategy")
            .field("max_retry_count", &self.max_retry_count)
            .field("retry_count", &self.retry_count)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl RetryStrategy for BackoffStrategy {
    fn can_retry(&self) -> bool {
        self.retry_count < self.max_retry_count
    }

    fn before_retry(&mut self) -> Result<(), RetryInterrupted> {
        self.retry_count = self.retry_count.saturating_add(1);
        let sleep = self
            .backoff
            .sleep_for(self.before_retry_sleep, self.retry_count);
        tracing::debug!(
            retry = self.retry_count,
            max_retries = self.max_retry_count,
            sleep_ms = sleep.as_millis() as u64,
            "waiting before retry"
        );
        self.sleeper.sleep(sleep)
    }

    fn retry_count(&self) -> u32 {
        self.retry_count
    }
}
