//! `tally describe` – print the canonical form of a matcher expression.

use anyhow::{Context, Result};
use tally_core::CountMatcher;

pub fn run_describe(expr: &str) -> Result<()> {
    let matcher: CountMatcher = expr
        .parse()
        .with_context(|| format!("invalid matcher expression {:?}", expr))?;
    println!("{}", matcher);
    Ok(())
}
