//! # schema-lock-core
//!
//! Advisory mutual exclusion backed by a database table.
//!
//! One process at a time may hold the lock on a shared database. The lock is a
//! one-row table: the marker row present means locked. Every claim and release runs
//! inside a transaction that first takes the database's exclusive, non-waiting write
//! gate, so concurrent claimants resolve to exactly one winner and everybody else
//! gets [`Error::AlreadyLocked`] immediately.
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` / `expect()` / `panic!()` - returns `Result` instead
//! - No `unsafe` - safe Rust only
//!
//! ## Modules
//!
//! - `coordinator`: the lock protocol ([`Coordinator`])
//! - `dialect`: engine error classification and SQL statements
//! - `store`: the connection capability the protocol consumes
//! - `sqlite`: `SQLite` implementation of that capability over `sqlx`
//! - `config`: layered configuration

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod coordinator;
pub mod dialect;
pub mod error;
pub mod sqlite;
pub mod store;

pub use config::{load_config, ConfigLayer, LockConfig, RetryConfig, RetryLayer};
pub use coordinator::{Coordinator, LockState, LockStatus, SETTLE_LIMIT};
pub use dialect::{Dialect, Signal, SqliteDialect, Statements, TableName, MARKER_ID};
pub use error::{Error, Operation, Result, Step};
pub use sqlite::SqliteStore;
pub use store::{LockStore, LockTransaction, StoreError};
