//! Configuration validation

use super::types::LockConfig;
use crate::{Error, Result};

/// Upper bound for the per-call deadline (one hour).
const MAX_TIMEOUT_MS: u64 = 3_600_000;

impl LockConfig {
    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any values are out of range or invalid
    pub fn validate(&self) -> Result<()> {
        let url = self.database_url.trim();
        if url.is_empty() {
            return Err(Error::InvalidConfig(
                "database_url cannot be empty".to_string(),
            ));
        }
        if !url.starts_with("sqlite:") {
            return Err(Error::InvalidConfig(format!(
                "database_url '{url}' is not supported - expected a sqlite: URL"
            )));
        }

        if self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(Error::InvalidConfig(format!(
                "timeout_ms must be at most {MAX_TIMEOUT_MS} (0 disables the deadline)"
            )));
        }

        if self.connect_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "connect_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if !(10..=60_000).contains(&self.retry.poll_ms) {
            return Err(Error::InvalidConfig(
                "retry.poll_ms must be 10-60000".to_string(),
            ));
        }

        if self.retry.max_poll_ms < self.retry.poll_ms {
            return Err(Error::InvalidConfig(
                "retry.max_poll_ms must not be smaller than retry.poll_ms".to_string(),
            ));
        }

        Ok(())
    }
}
