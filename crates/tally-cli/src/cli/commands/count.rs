//! `tally count` – verify the number of non-empty lines in a file or stdin.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::Path;
use tally_core::verify::{verify, CardinalityError};
use tally_core::CountMatcher;

/// Non-empty lines of `text`, verified against `expect`.
pub(crate) fn verified_lines<'a>(
    text: &'a str,
    expect: &CountMatcher,
    unit: &str,
) -> Result<Vec<&'a str>, CardinalityError> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    verify(lines, expect, unit)
}

pub fn run_count(expect: &CountMatcher, unit: &str, path: Option<&Path>) -> Result<()> {
    let text = match path {
        Some(p) => fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?,
        None => io::read_to_string(io::stdin()).context("reading stdin")?,
    };
    let lines = verified_lines(&text, expect, unit)?;
    tracing::debug!(count = lines.len(), expect = %expect, "line count verified");
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_not_counted() {
        let text = "a\n\n  \nb\n";
        let lines = verified_lines(text, &CountMatcher::exactly(2), "line").unwrap();
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[test]
    fn mismatch_message_uses_unit() {
        let err = verified_lines("x\ny\nz\n", &CountMatcher::exactly(2), "row").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected exactly 2 row(s), but found 3 row(s)"
        );
    }

    #[test]
    fn empty_input_with_negated_expectation() {
        let expect = CountMatcher::at_least(1).not();
        assert!(verified_lines("", &expect, "line").unwrap().is_empty());
    }
}
