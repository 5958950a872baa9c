//! `tally run` – run a program under the retry policy.

use anyhow::{bail, Context, Result};
use std::process::{Command, Stdio};
use tally_core::config::{BackoffKind, RetryConfig, TallyConfig};
use tally_core::retry;
use tally_core::CountMatcher;

use super::count::verified_lines;

/// Command-line values that take precedence over the `[retry]` config section.
#[derive(Debug, Clone, Default)]
pub struct RetryOverrides {
    pub retries: Option<u32>,
    pub sleep_ms: Option<u64>,
    pub backoff: Option<BackoffKind>,
    pub max_sleep_ms: Option<u64>,
}

impl RetryOverrides {
    /// Config section (or defaults) with any command-line values applied.
    pub fn apply(&self, cfg: &TallyConfig) -> RetryConfig {
        let mut retry = cfg.retry_or_default();
        if let Some(n) = self.retries {
            retry.max_retry_count = n;
        }
        if let Some(ms) = self.sleep_ms {
            retry.before_retry_sleep_ms = ms;
        }
        if let Some(b) = self.backoff {
            retry.backoff = b;
        }
        if let Some(ms) = self.max_sleep_ms {
            retry.max_sleep_ms = ms;
        }
        retry
    }
}

/// One attempt: spawn, wait, check exit status and (optionally) the line count.
/// Returns captured stdout.
fn attempt(command: &[String], expect: Option<&CountMatcher>, unit: &str) -> Result<String> {
    let (program, args) = command.split_first().context("no program given")?;
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()
        .with_context(|| format!("failed to start {}", program))?;

    if !output.status.success() {
        bail!("{} exited with {}", program, output.status);
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if let Some(expect) = expect {
        verified_lines(&stdout, expect, unit)?;
    }
    Ok(stdout)
}

pub fn run_retry(
    cfg: &TallyConfig,
    overrides: &RetryOverrides,
    expect: Option<&CountMatcher>,
    unit: &str,
    command: &[String],
) -> Result<()> {
    let policy = overrides.apply(cfg).to_policy()?;
    tracing::debug!(?policy, command = ?command, "running with retry");

    let mut attempts = 0u32;
    let stdout = retry::call(&policy, || {
        attempts += 1;
        attempt(command, expect, unit).map_err(|e| {
            tracing::info!(attempt = attempts, "attempt failed: {:#}", e);
            e
        })
    })?;

    print!("{}", stdout);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_take_precedence_over_config() {
        let cfg = TallyConfig {
            retry: Some(RetryConfig {
                max_retry_count: 7,
                before_retry_sleep_ms: 100,
                backoff: BackoffKind::Fixed,
                max_sleep_ms: 1000,
            }),
            default_unit: None,
        };
        let overrides = RetryOverrides {
            retries: Some(2),
            backoff: Some(BackoffKind::Exponential),
            ..RetryOverrides::default()
        };
        let retry = overrides.apply(&cfg);
        assert_eq!(retry.max_retry_count, 2);
        assert_eq!(retry.before_retry_sleep_ms, 100);
        assert_eq!(retry.backoff, BackoffKind::Exponential);
        assert_eq!(retry.max_sleep_ms, 1000);
    }

    #[test]
    fn zero_sleep_override_is_a_config_error() {
        let overrides = RetryOverrides {
            sleep_ms: Some(0),
            ..RetryOverrides::default()
        };
        let err = run_retry(
            &TallyConfig::default(),
            &overrides,
            None,
            "line",
            &["true".to_string()],
        )
        .unwrap_err();
        assert!(err.to_string().contains("at least 1ms"), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn attempt_checks_exit_status_and_count() {
        let echo = |s: &str| vec!["sh".to_string(), "-c".to_string(), s.to_string()];

        let out = attempt(&echo("printf 'a\\nb\\n'"), Some(&CountMatcher::exactly(2)), "line")
            .unwrap();
        assert_eq!(out, "a\nb\n");

        let err = attempt(&echo("printf 'a\\n'"), Some(&CountMatcher::exactly(2)), "line")
            .unwrap_err();
        assert!(err.to_string().contains("found 1"), "{err}");

        let err = attempt(&echo("exit 3"), None, "line").unwrap_err();
        assert!(err.to_string().contains("exited with"), "{err}");
    }

    #[test]
    fn missing_program_fails_to_start() {
        let err = attempt(&["tally-no-such-program-xyz".to_string()], None, "line").unwrap_err();
        assert!(err.to_string().contains("failed to start"), "{err}");
    }
}
