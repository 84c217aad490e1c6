//! Run a command while holding the schema lock
//!
//! The lock is released on every path out of the child command: normal exit,
//! spawn failure and Ctrl-C.

use std::{process::ExitStatus, time::Duration};

use anyhow::{Context, Result};
use schema_lock_core::{Coordinator, LockConfig, LockStore};
use tokio::process::Command;
use tracing::{info, warn};

use super::lock::{acquire_with_wait, release_wait, release_with_wait};

/// Exit code after Ctrl-C (128 + SIGINT).
pub const INTERRUPTED_EXIT: i32 = 130;

/// Run command options
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub program: String,
    pub args: Vec<String>,
    /// Retry budget for a contended lock.
    pub wait: Option<Duration>,
}

/// Acquire the lock, run the command, release the lock.
///
/// Returns the child's exit code.
///
/// # Errors
///
/// Returns an error if:
/// - The lock could not be acquired (the command is not started)
/// - The command could not be started
/// - The lock could not be released afterwards, even after retrying contention
///   for [`release_wait`]
pub async fn run<S: LockStore>(
    coordinator: &Coordinator<S>,
    config: &LockConfig,
    options: &RunOptions,
) -> Result<i32> {
    acquire_with_wait(coordinator, config, options.wait).await?;
    info!(program = %options.program, "running command under schema lock");

    let outcome = supervise(options).await;

    let released = release_with_wait(coordinator, config, Some(release_wait(config))).await;
    let code = outcome?;
    released.context("command finished but the schema lock was not released")?;

    info!(code, "command finished, schema lock released");
    Ok(code)
}

async fn supervise(options: &RunOptions) -> Result<i32> {
    let mut child = Command::new(&options.program)
        .args(&options.args)
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to start '{}'", options.program))?;

    tokio::select! {
        status = child.wait() => {
            let status = status.with_context(|| format!("failed to wait for '{}'", options.program))?;
            return Ok(exit_code(status));
        }
        signal = tokio::signal::ctrl_c() => signal.context("failed to listen for Ctrl-C")?,
    }

    warn!(program = %options.program, "interrupted, stopping command");
    child
        .kill()
        .await
        .with_context(|| format!("failed to stop '{}'", options.program))?;
    Ok(INTERRUPTED_EXIT)
}

/// Exit code to report for a finished child. Death by signal maps to 128 + signal.
fn exit_code(status: ExitStatus) -> i32 {
    status.code().or_else(|| signal_code(status)).unwrap_or(1)
}

#[cfg(unix)]
fn signal_code(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal().map(|signal| 128 + signal)
}

#[cfg(not(unix))]
const fn signal_code(_status: ExitStatus) -> Option<i32> {
    None
}
