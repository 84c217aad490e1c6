use std::time::Duration;

use anyhow::Result;
use clap::ArgMatches;
use schema_lock_core::Coordinator;

use super::{finish, settings};
use crate::commands::{
    lock,
    run::{self, RunOptions},
    OutputFormat,
};

fn format(matches: &ArgMatches) -> OutputFormat {
    OutputFormat::from_json_flag(matches.get_flag("json"))
}

fn wait(matches: &ArgMatches) -> Option<Duration> {
    matches
        .get_one::<u64>("wait-ms")
        .map(|ms| Duration::from_millis(*ms))
}

pub async fn handle_acquire(matches: &ArgMatches) -> Result<i32> {
    let config = settings(matches)?;
    let coordinator = Coordinator::connect(&config).await?;
    let outcome = lock::acquire(&coordinator, &config, wait(matches), format(matches)).await;
    finish(coordinator, outcome).await.map(|()| 0)
}

pub async fn handle_release(matches: &ArgMatches) -> Result<i32> {
    let config = settings(matches)?;
    let coordinator = Coordinator::connect(&config).await?;
    let budget = wait(matches).unwrap_or_else(|| lock::release_wait(&config));
    let outcome = lock::release(&coordinator, &config, Some(budget), format(matches)).await;
    finish(coordinator, outcome).await.map(|()| 0)
}

pub async fn handle_status(matches: &ArgMatches) -> Result<i32> {
    let config = settings(matches)?;
    let coordinator = Coordinator::connect(&config).await?;
    let outcome = lock::status(&coordinator, &config, format(matches)).await;
    finish(coordinator, outcome).await.map(|()| 0)
}

pub async fn handle_run(matches: &ArgMatches) -> Result<i32> {
    let mut command = matches
        .get_many::<String>("command")
        .ok_or_else(|| anyhow::anyhow!("Command is required"))?
        .cloned();
    let program = command
        .next()
        .ok_or_else(|| anyhow::anyhow!("Command is required"))?;
    let options = RunOptions {
        program,
        args: command.collect(),
        wait: wait(matches),
    };

    let config = settings(matches)?;
    let coordinator = Coordinator::connect(&config).await?;
    let outcome = run::run(&coordinator, &config, &options).await;
    finish(coordinator, outcome).await
}
