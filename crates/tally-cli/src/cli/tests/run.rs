//! Tests for the run subcommand.

use super::parse;
use crate::cli::{BackoffArg, Cli, CliCommand};
use clap::Parser;
use tally_core::CountMatcher;

#[test]
fn cli_parse_run_defaults() {
    match parse(&["tally", "run", "--", "curl", "-sf", "http://localhost/health"]) {
        CliCommand::Run {
            retries,
            sleep_ms,
            backoff,
            max_sleep_ms,
            expect,
            unit,
            command,
        } => {
            assert!(retries.is_none());
            assert!(sleep_ms.is_none());
            assert!(backoff.is_none());
            assert!(max_sleep_ms.is_none());
            assert!(expect.is_none());
            assert!(unit.is_none());
            assert_eq!(command, vec!["curl", "-sf", "http://localhost/health"]);
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_with_policy_and_expectation() {
    match parse(&[
        "tally",
        "run",
        "--retries",
        "4",
        "--sleep-ms",
        "250",
        "--backoff",
        "exponential",
        "--max-sleep-ms",
        "2000",
        "--expect",
        "at least 1 and not exactly 3",
        "--unit",
        "row",
        "psql",
        "-c",
        "select 1",
    ]) {
        CliCommand::Run {
            retries,
            sleep_ms,
            backoff,
            max_sleep_ms,
            expect,
            unit,
            command,
        } => {
            assert_eq!(retries, Some(4));
            assert_eq!(sleep_ms, Some(250));
            assert_eq!(backoff, Some(BackoffArg::Exponential));
            assert_eq!(max_sleep_ms, Some(2000));
            assert_eq!(
                expect,
                Some(CountMatcher::at_least(1).and(CountMatcher::exactly(3).not()))
            );
            assert_eq!(unit.as_deref(), Some("row"));
            assert_eq!(command, vec!["psql", "-c", "select 1"]);
        }
        _ => panic!("expected Run with options"),
    }
}

#[test]
fn cli_parse_run_requires_command() {
    assert!(Cli::try_parse_from(["tally", "run"]).is_err());
}

#[test]
fn cli_parse_run_rejects_bad_expectation() {
    assert!(Cli::try_parse_from(["tally", "run", "--expect", "at most 2", "--", "true"]).is_err());
}

#[test]
fn cli_parse_run_rejects_negative_retries() {
    assert!(Cli::try_parse_from(["tally", "run", "--retries", "-1", "--", "true"]).is_err());
}

#[test]
fn cli_parse_global_config() {
    let cli = Cli::try_parse_from(["tally", "run", "--config", "/tmp/t.toml", "--", "true"]).unwrap();
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/t.toml")));
}
