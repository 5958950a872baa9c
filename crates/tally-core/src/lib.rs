//! Cardinality matchers, a retry engine, and the verification glue between them.

pub mod config;
pub mod logging;

pub mod matcher;
pub mod retry;
pub mod verify;

pub use matcher::CountMatcher;
pub use verify::{verify, CardinalityError};
