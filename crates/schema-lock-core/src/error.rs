//! Error types for schema-lock-core
//!
//! Contention is an expected outcome and has its own variant. Everything the
//! database does wrong is classified at the point of failure and carried as a
//! [`StoreError`] source, so no engine type crosses the coordinator boundary.

use std::time::Duration;

use strum::Display;
use thiserror::Error;

use crate::store::StoreError;

/// Lock protocol entry point an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Connect,
    Acquire,
    Release,
    Status,
    Close,
}

/// Step inside an operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Step {
    #[strum(serialize = "open connection")]
    Connect,
    #[strum(serialize = "begin transaction")]
    Begin,
    #[strum(serialize = "create lock table")]
    CreateTable,
    #[strum(serialize = "lock table")]
    LockTable,
    #[strum(serialize = "insert marker row")]
    InsertMarker,
    #[strum(serialize = "delete marker row")]
    DeleteMarker,
    #[strum(serialize = "probe lock table")]
    ProbeTable,
    #[strum(serialize = "count marker rows")]
    CountMarkers,
    #[strum(serialize = "close connection")]
    Close,
}

/// Core error type for schema lock operations
#[derive(Debug, Error)]
pub enum Error {
    /// Another participant holds the lock, or is mid-operation on the lock table.
    #[error("Lock table '{table}' is already locked")]
    AlreadyLocked { table: String },

    /// Unexpected database failure; the transaction was rolled back.
    #[error("{operation}: failed to {step} on '{table}': {source}")]
    Storage {
        operation: Operation,
        step: Step,
        table: String,
        #[source]
        source: StoreError,
    },

    /// Commit failed, so whether the change landed is unknown. Re-probe with `status`.
    #[error("{operation}: commit failed on '{table}', lock state is indeterminate: {source}")]
    Indeterminate {
        operation: Operation,
        table: String,
        #[source]
        source: StoreError,
    },

    /// The caller's deadline expired; the open transaction was rolled back.
    #[error("{operation} did not complete within {limit:?}")]
    DeadlineExceeded { operation: Operation, limit: Duration },

    /// Configuration value failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be parsed
    #[error("Parse error: {0}")]
    ConfigParse(String),

    /// Filesystem error while loading configuration
    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    pub(crate) fn storage(
        operation: Operation,
        step: Step,
        table: impl Into<String>,
        source: StoreError,
    ) -> Self {
        Self::Storage {
            operation,
            step,
            table: table.into(),
            source,
        }
    }

    pub(crate) fn already_locked(table: impl Into<String>) -> Self {
        Self::AlreadyLocked {
            table: table.into(),
        }
    }

    /// Stable machine-readable error code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::AlreadyLocked { .. } => "ALREADY_LOCKED",
            Self::Storage { .. } => "STORAGE_ERROR",
            Self::Indeterminate { .. } => "INDETERMINATE_STATE",
            Self::DeadlineExceeded { .. } => "DEADLINE_EXCEEDED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ConfigParse(_) => "CONFIG_PARSE_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Returns the process exit code for this error.
    ///
    /// - 1: invalid configuration
    /// - 2: storage failure or deadline
    /// - 3: already locked
    /// - 4: indeterminate lock state
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig(_) | Self::ConfigParse(_) | Self::Io(_) => 1,
            Self::Storage { .. } | Self::DeadlineExceeded { .. } => 2,
            Self::AlreadyLocked { .. } => 3,
            Self::Indeterminate { .. } => 4,
        }
    }

    pub const fn is_already_locked(&self) -> bool {
        matches!(self, Self::AlreadyLocked { .. })
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigParse(format!("Failed to parse config: {err}"))
    }
}

/// Result type alias for schema lock operations
pub type Result<T> = std::result::Result<T, Error>;
