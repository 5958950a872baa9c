//! Retry engine.
//!
//! A [`RetryStrategyFactory`] is configured once and handed to every
//! [`run`] / [`call`] that should share the policy. Each call obtains a fresh
//! [`RetryStrategy`] from it, so per-invocation counters never leak between
//! operations. The engine treats every operation error alike; callers that
//! only want to retry some errors filter inside the operation.

mod error;
mod policy;
mod run;
mod strategy;

pub use error::{RetryConfigError, RetryInterrupted};
pub use policy::{Backoff, BackoffStrategy, RetryPolicy};
pub use run::{call, run};
pub use strategy::{RetryStrategy, RetryStrategyFactory, Sleeper, ThreadSleeper};
