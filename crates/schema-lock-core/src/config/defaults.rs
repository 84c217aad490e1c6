//! Default configuration values

use super::types::{LockConfig, RetryConfig};
use crate::dialect::TableName;

const DEFAULT_DATABASE_URL: &str = "sqlite://schema_lock.db";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_POLL_MS: u64 = 250;
const DEFAULT_MAX_POLL_MS: u64 = 5_000;

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            table: TableName::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            poll_ms: DEFAULT_POLL_MS,
            max_poll_ms: DEFAULT_MAX_POLL_MS,
        }
    }
}
