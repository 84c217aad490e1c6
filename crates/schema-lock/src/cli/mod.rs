//! CLI argument definitions and command builders

pub mod handlers;

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("schema-lock")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Advisory schema lock held in a database table")
        .long_about(
            "Advisory Schema Lock\n\
             \n\
             One process at a time may hold the lock on a shared database.\n\
             The lock is a one-row table; a present row means locked.\n\
             Contention never waits inside the database: a refused claim\n\
             exits with code 3 straight away.\n\
             \n\
             EXIT CODES:\n  \
             0  success\n  \
             1  invalid configuration or usage\n  \
             2  database failure or deadline exceeded\n  \
             3  already locked\n  \
             4  lock state unknown after a failed commit (run 'status')",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Config file layered over the global and project config"),
        )
        .arg(
            Arg::new("database-url")
                .long("database-url")
                .global(true)
                .value_name("URL")
                .help("Database holding the lock table, e.g. sqlite:///srv/app/app.db"),
        )
        .arg(
            Arg::new("table")
                .long("table")
                .global(true)
                .value_name("NAME")
                .help("Lock table name"),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .global(true)
                .value_name("MS")
                .value_parser(value_parser!(u64))
                .help("Deadline for each database operation; 0 disables it"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Output as JSON for machine parsing"),
        )
        .subcommand(cmd_acquire())
        .subcommand(cmd_release())
        .subcommand(cmd_status())
        .subcommand(cmd_run())
}

fn arg_wait() -> Arg {
    Arg::new("wait-ms")
        .long("wait-ms")
        .value_name("MS")
        .value_parser(value_parser!(u64))
        .help("Keep retrying a contended lock for up to MS milliseconds")
}

fn cmd_acquire() -> Command {
    Command::new("acquire")
        .about("Claim the lock, failing fast if someone else holds it")
        .arg(arg_wait())
}

fn cmd_release() -> Command {
    Command::new("release")
        .about("Give the lock up (no-op when nobody holds it)")
        .arg(arg_wait().help(
            "Keep retrying while the lock table is busy for up to MS milliseconds \
             [default: the operation deadline, or 60000 when deadlines are off]",
        ))
}

fn cmd_status() -> Command {
    Command::new("status").about("Show whether the lock is held")
}

fn cmd_run() -> Command {
    Command::new("run")
        .about("Hold the lock while a command runs")
        .long_about(
            "Acquire the lock, run COMMAND, then release the lock whatever the\n\
             command's outcome. Exits with the command's exit code.\n\
             Ctrl-C stops the command, releases the lock and exits with 130.\n\
             \n\
             EXAMPLE:\n  \
             schema-lock run --wait-ms 60000 -- ./migrate up",
        )
        .arg(arg_wait())
        .arg(
            Arg::new("command")
                .value_name("COMMAND")
                .required(true)
                .num_args(1..)
                .last(true)
                .help("Command and arguments, after `--`"),
        )
}
