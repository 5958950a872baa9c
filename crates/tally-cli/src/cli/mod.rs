//! CLI for tally.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tally_core::config::{self, BackoffKind};
use tally_core::CountMatcher;

use commands::{run_count, run_describe, run_retry, RetryOverrides};

/// Top-level CLI for tally.
#[derive(Debug, Parser)]
#[command(name = "tally")]
#[command(about = "tally: retry commands and check how many results they produce", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of ~/.config/tally/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Backoff schedule selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackoffArg {
    Fixed,
    Exponential,
}

impl From<BackoffArg> for BackoffKind {
    fn from(b: BackoffArg) -> Self {
        match b {
            BackoffArg::Fixed => BackoffKind::Fixed,
            BackoffArg::Exponential => BackoffKind::Exponential,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run a program, retrying on failure (and on a line-count mismatch with --expect).
    Run {
        /// Retries after the first attempt.
        #[arg(long, value_name = "N")]
        retries: Option<u32>,
        /// Sleep before each retry, in milliseconds (at least 1).
        #[arg(long, value_name = "MS")]
        sleep_ms: Option<u64>,
        /// Backoff schedule between retries.
        #[arg(long, value_enum)]
        backoff: Option<BackoffArg>,
        /// Cap for exponential backoff, in milliseconds.
        #[arg(long, value_name = "MS")]
        max_sleep_ms: Option<u64>,
        /// Expected number of non-empty stdout lines, e.g. "at least 1".
        #[arg(long, value_name = "EXPR")]
        expect: Option<CountMatcher>,
        /// Name of what is counted, used in mismatch messages.
        #[arg(long, value_name = "NAME")]
        unit: Option<String>,
        /// Program and arguments.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Check the number of non-empty lines in a file (or stdin).
    Count {
        /// Expected number of lines, e.g. "exactly 2".
        #[arg(long, value_name = "EXPR")]
        expect: CountMatcher,
        /// Name of what is counted, used in mismatch messages.
        #[arg(long, value_name = "NAME")]
        unit: Option<String>,
        /// File to read; stdin when omitted.
        path: Option<PathBuf>,
    },

    /// Print the canonical form of a matcher expression.
    Describe {
        /// Expression words, e.g. `at least 1 and not exactly 3`.
        #[arg(required = true, num_args = 1..)]
        expr: Vec<String>,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = match &cli.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                retries,
                sleep_ms,
                backoff,
                max_sleep_ms,
                expect,
                unit,
                command,
            } => {
                let overrides = RetryOverrides {
                    retries,
                    sleep_ms,
                    backoff: backoff.map(BackoffKind::from),
                    max_sleep_ms,
                };
                let unit = unit.unwrap_or_else(|| cfg.unit_or_default().to_string());
                run_retry(&cfg, &overrides, expect.as_ref(), &unit, &command)?;
            }
            CliCommand::Count { expect, unit, path } => {
                let unit = unit.unwrap_or_else(|| cfg.unit_or_default().to_string());
                run_count(&expect, &unit, path.as_deref())?;
            }
            CliCommand::Describe { expr } => run_describe(&expr.join(" "))?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
