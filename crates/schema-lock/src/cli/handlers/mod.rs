//! CLI command handlers that bridge between `clap` and internal logic

mod lock;

use std::path::PathBuf;

use anyhow::Result;
use clap::ArgMatches;
use schema_lock_core::{load_config, Coordinator, LockConfig, TableName};
use tracing::warn;

/// Route a parsed command line. Returns the process exit code.
pub async fn dispatch(matches: &ArgMatches) -> Result<i32> {
    match matches.subcommand() {
        Some(("acquire", sub_m)) => lock::handle_acquire(sub_m).await,
        Some(("release", sub_m)) => lock::handle_release(sub_m).await,
        Some(("status", sub_m)) => lock::handle_status(sub_m).await,
        Some(("run", sub_m)) => lock::handle_run(sub_m).await,
        _ => anyhow::bail!("Unknown command. Run 'schema-lock --help' for usage."),
    }
}

/// Format an error for user display (no stack traces)
pub fn format_error(err: &anyhow::Error) -> String {
    let msg = err.to_string();
    if let Some(source) = err.source() {
        let source_msg = source.to_string();
        if !msg.contains(&source_msg) && !source_msg.is_empty() {
            return format!("{msg}\nCause: {source_msg}");
        }
    }
    msg
}

/// Load layered configuration, then apply the global command-line flags on top.
fn settings(matches: &ArgMatches) -> Result<LockConfig> {
    let explicit = matches.get_one::<PathBuf>("config");
    let config = load_config(explicit.map(PathBuf::as_path))?;
    let config = apply_flags(config, matches)?;
    config.validate()?;
    Ok(config)
}

fn apply_flags(config: LockConfig, matches: &ArgMatches) -> schema_lock_core::Result<LockConfig> {
    let database_url = matches
        .get_one::<String>("database-url")
        .cloned()
        .unwrap_or(config.database_url);
    let table = match matches.get_one::<String>("table") {
        Some(name) => TableName::parse(name)?,
        None => config.table,
    };
    let timeout_ms = matches
        .get_one::<u64>("timeout-ms")
        .copied()
        .unwrap_or(config.timeout_ms);

    Ok(LockConfig {
        database_url,
        table,
        timeout_ms,
        ..config
    })
}

/// Close the handle whatever the command's outcome. The lock is left as the
/// command left it.
async fn finish<T>(coordinator: Coordinator, outcome: Result<T>) -> Result<T> {
    if let Err(err) = coordinator.close().await {
        warn!(error = %err, "failed to close lock database connection");
    }
    outcome
}
