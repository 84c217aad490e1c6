//! Configuration type definitions

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dialect::TableName;

/// Root configuration structure
///
/// Loaded from defaults → global → project → explicit file → env vars → CLI flags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LockConfig {
    /// Database holding the lock table, e.g. `sqlite:///srv/app/app.db`.
    pub database_url: String,
    pub table: TableName,
    /// Deadline for a single acquire/release/status call; 0 disables it.
    pub timeout_ms: u64,
    /// How long opening the connection may wait on a busy database.
    pub connect_timeout_ms: u64,
    pub retry: RetryConfig,
}

/// Backoff used by callers that wait for a contended lock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    pub poll_ms: u64,
    pub max_poll_ms: u64,
}

/// One config file's contents. Absent keys leave the earlier layer untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigLayer {
    pub database_url: Option<String>,
    pub table: Option<TableName>,
    pub timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub retry: RetryLayer,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryLayer {
    pub poll_ms: Option<u64>,
    pub max_poll_ms: Option<u64>,
}

impl LockConfig {
    /// Deadline handed to each coordinator call.
    pub const fn deadline(&self) -> Option<Duration> {
        if self.timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.timeout_ms))
        }
    }

    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl RetryConfig {
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    pub const fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_poll_ms)
    }
}
