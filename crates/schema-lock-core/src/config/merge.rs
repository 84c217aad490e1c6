//! Configuration merging logic (Immutable functional pattern)
//!
//! Later layers override earlier ones. A key present in a layer always wins,
//! even when it restates the built-in default.

use super::types::{ConfigLayer, LockConfig, RetryConfig, RetryLayer};

impl LockConfig {
    /// Merge a config layer into this one (layer takes precedence) - immutable pattern
    pub fn merge(self, layer: ConfigLayer) -> Self {
        Self {
            database_url: layer.database_url.unwrap_or(self.database_url),
            table: layer.table.unwrap_or(self.table),
            timeout_ms: layer.timeout_ms.unwrap_or(self.timeout_ms),
            connect_timeout_ms: layer.connect_timeout_ms.unwrap_or(self.connect_timeout_ms),
            retry: self.retry.merge(layer.retry),
        }
    }
}

impl RetryConfig {
    fn merge(self, layer: RetryLayer) -> Self {
        Self {
            poll_ms: layer.poll_ms.unwrap_or(self.poll_ms),
            max_poll_ms: layer.max_poll_ms.unwrap_or(self.max_poll_ms),
        }
    }
}
