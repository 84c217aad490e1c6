//! schema-lock - run one job at a time against a shared database
//!
//! Thin CLI over `schema-lock-core`: claim, release and inspect the lock, or
//! hold it for the lifetime of a child command.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
