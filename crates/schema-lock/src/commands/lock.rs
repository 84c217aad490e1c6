//! Lock command implementation
//!
//! `acquire`, `release` and `status` over one coordinator handle.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]

use std::{future::Future, time::Duration};

use anyhow::Result;
use schema_lock_core::{Coordinator, LockConfig, LockStatus, LockStore};
use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

use super::OutputFormat;

/// Release retry budget when operation deadlines are disabled.
pub const DEFAULT_RELEASE_WAIT: Duration = Duration::from_secs(60);

/// Result of a lock command as printed to stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockReport {
    pub table: String,
    pub status: LockStatus,
    /// Attempts the command took (acquire and release).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
}

/// Run the acquire command
///
/// # Errors
///
/// Returns an error if:
/// - The lock is held elsewhere and the wait budget (if any) ran out
/// - The database failed or the deadline expired
pub async fn acquire<S: LockStore>(
    coordinator: &Coordinator<S>,
    config: &LockConfig,
    wait: Option<Duration>,
    format: OutputFormat,
) -> Result<()> {
    let attempts = acquire_with_wait(coordinator, config, wait).await?;
    let report = LockReport {
        table: coordinator.table().to_string(),
        status: LockStatus::Locked,
        attempts: Some(attempts),
    };
    let human = format!("✓ Acquired schema lock on '{}'", report.table);
    println!("{}", render(&report, format, &human)?);
    Ok(())
}

/// Run the release command
///
/// Contention is retried for `wait` (see [`release_wait`] for the default).
///
/// # Errors
///
/// Returns an error if another participant kept the lock table busy for the
/// whole wait budget, or the database failed
pub async fn release<S: LockStore>(
    coordinator: &Coordinator<S>,
    config: &LockConfig,
    wait: Option<Duration>,
    format: OutputFormat,
) -> Result<()> {
    let attempts = release_with_wait(coordinator, config, wait).await?;
    let report = LockReport {
        table: coordinator.table().to_string(),
        status: LockStatus::Unlocked,
        attempts: Some(attempts),
    };
    let human = format!("✓ Released schema lock on '{}'", report.table);
    println!("{}", render(&report, format, &human)?);
    Ok(())
}

/// Run the status command
///
/// # Errors
///
/// Returns an error if the lock table cannot be read
pub async fn status<S: LockStore>(
    coordinator: &Coordinator<S>,
    config: &LockConfig,
    format: OutputFormat,
) -> Result<()> {
    let status = coordinator.status(config.deadline()).await?;
    let report = LockReport {
        table: coordinator.table().to_string(),
        status,
        attempts: None,
    };
    let human = format!("Schema lock '{}' is {status}", report.table);
    println!("{}", render(&report, format, &human)?);
    Ok(())
}

/// Claim the lock, retrying contention with exponential backoff until `wait` runs out.
///
/// Without a wait budget this is a single attempt. Only contention is retried;
/// any other failure is returned at once.
pub async fn acquire_with_wait<S: LockStore>(
    coordinator: &Coordinator<S>,
    config: &LockConfig,
    wait: Option<Duration>,
) -> schema_lock_core::Result<u32> {
    let deadline = config.deadline();
    with_backoff(config, wait, move || coordinator.acquire(deadline)).await
}

/// Give the lock up, retrying a busy lock table the same way as [`acquire_with_wait`].
///
/// Waiters polling with `acquire` hold the gate for a moment on every attempt,
/// so a single release attempt can lose to them.
pub async fn release_with_wait<S: LockStore>(
    coordinator: &Coordinator<S>,
    config: &LockConfig,
    wait: Option<Duration>,
) -> schema_lock_core::Result<u32> {
    let deadline = config.deadline();
    with_backoff(config, wait, move || coordinator.release(deadline)).await
}

/// Default retry budget for a release: the operation deadline, or
/// [`DEFAULT_RELEASE_WAIT`] when deadlines are disabled.
pub fn release_wait(config: &LockConfig) -> Duration {
    config.deadline().unwrap_or(DEFAULT_RELEASE_WAIT)
}

async fn with_backoff<Fut>(
    config: &LockConfig,
    wait: Option<Duration>,
    mut attempt: impl FnMut() -> Fut,
) -> schema_lock_core::Result<u32>
where
    Fut: Future<Output = schema_lock_core::Result<()>>,
{
    let started = Instant::now();
    let mut delay = config.retry.poll_interval();
    let mut attempts = 0;

    loop {
        attempts += 1;
        match attempt().await {
            Ok(()) => return Ok(attempts),
            Err(err) if err.is_already_locked() => {
                let remaining = wait
                    .map(|budget| budget.saturating_sub(started.elapsed()))
                    .filter(|left| !left.is_zero());
                let Some(remaining) = remaining else {
                    return Err(err);
                };
                debug!(attempts, ?delay, "schema lock is busy, retrying");
                tokio::time::sleep(delay.min(remaining)).await;
                delay = next_delay(delay, config.retry.max_interval());
            }
            Err(err) => return Err(err),
        }
    }
}

/// Double the poll interval, capped at `max`.
pub fn next_delay(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}

fn render(report: &LockReport, format: OutputFormat, human: &str) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Human => Ok(human.to_string()),
    }
}
