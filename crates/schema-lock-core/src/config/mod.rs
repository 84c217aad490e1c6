//! Configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config: ~/.config/schema-lock/config.toml
//! 3. Project config: .schema-lock.toml
//! 4. Explicit config file (`--config`)
//! 5. Environment variables: `SCHEMA_LOCK_*`
//! 6. CLI flags (applied by the binary)
//!
//! # Example Config
//!
//! ```toml
//! database_url = "sqlite:///var/lib/deploy/app.db"
//! table = "schema_lock"
//! timeout_ms = 10000
//!
//! [retry]
//! poll_ms = 250
//! max_poll_ms = 5000
//! ```

mod defaults;
mod load;
mod merge;
mod types;
mod validate;


pub use load::{
    global_config_path, load_config, load_toml_file, project_config_path, PROJECT_CONFIG_FILE,
};
pub use types::{ConfigLayer, LockConfig, RetryConfig, RetryLayer};
