//! Errors raised by the retry engine itself (never by the retried operation).

use std::io;
use std::time::Duration;

/// Invalid retry policy parameters, reported before any attempt is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetryConfigError {
    #[error("before-retry sleep must be at least 1ms, got {0:?}")]
    SleepTooShort(Duration),
    #[error("maximum sleep {max:?} is below the before-retry sleep {base:?}")]
    MaxSleepBelowBase { base: Duration, max: Duration },
}

/// The wait before a retry failed (e.g. the sleeper was interrupted).
/// Never retried; the retry loop is abandoned immediately.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("retry interrupted: {reason}")]
pub struct RetryInterrupted {
    pub reason: String,
}

impl RetryInterrupted {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<RetryInterrupted> for io::Error {
    fn from(e: RetryInterrupted) -> io::Error {
        io::Error::new(io::ErrorKind::Interrupted, e)
    }
}
