//! CLI command handlers. Each command is in its own file.

mod count;
mod describe;
mod run;

pub use count::run_count;
pub use describe::run_describe;
pub use run::{run_retry, RetryOverrides};
