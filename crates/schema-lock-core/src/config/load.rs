//! Configuration loading from files and environment (Immutable functional pattern)
//!
//! All operations return new instances rather than mutating in place.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::{ConfigLayer, LockConfig};
use crate::{dialect::TableName, Error, Result};

/// Project config file, looked up in the current directory.
pub const PROJECT_CONFIG_FILE: &str = ".schema-lock.toml";

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

/// Load configuration from all sources with hierarchy
///
/// `explicit` is a config file named on the command line; unlike the global and
/// project files it must exist.
///
/// # Errors
///
/// Returns error if:
/// - A config file is malformed TOML
/// - An environment variable has an invalid value
/// - Config values fail validation
pub fn load_config(explicit: Option<&Path>) -> Result<LockConfig> {
    // 1. Start with built-in defaults
    let config = LockConfig::default();

    // 2. Load global config if exists
    let config = match global_config_path() {
        Some(global_path) if global_path.is_file() => {
            debug!(path = %global_path.display(), "loading global config");
            config.merge(load_toml_file(&global_path)?)
        }
        _ => config,
    };

    // 3. Load project config if exists
    let project_path = project_config_path()?;
    let config = if project_path.is_file() {
        debug!(path = %project_path.display(), "loading project config");
        config.merge(load_toml_file(&project_path)?)
    } else {
        config
    };

    // 4. Explicit config file
    let config = match explicit {
        Some(path) => {
            debug!(path = %path.display(), "loading config file");
            config.merge(load_toml_file(path)?)
        }
        None => config,
    };

    // 5. Apply environment variable overrides
    let config = config.apply_env_vars()?;

    config.validate()?;
    Ok(config)
}

// ═══════════════════════════════════════════════════════════════════════════
// PATH HELPERS
// ═══════════════════════════════════════════════════════════════════════════

/// Get path to global config file
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "schema-lock")
        .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
}

/// Get path to project config file
///
/// # Errors
///
/// Returns error if current directory cannot be determined
pub fn project_config_path() -> Result<PathBuf> {
    std::env::current_dir()
        .map(|dir| dir.join(PROJECT_CONFIG_FILE))
        .map_err(|e| Error::Io(format!("Failed to get current directory: {e}")))
}

/// Load a TOML file as a config layer
///
/// # Errors
///
/// Returns error if:
/// - File cannot be read
/// - Path is a directory instead of a file
/// - TOML is malformed
pub fn load_toml_file(path: &Path) -> Result<ConfigLayer> {
    if path.is_dir() {
        return Err(Error::Io(format!(
            "Config path is a directory, not a file: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Io(format!("Failed to read config file {}: {e}", path.display())))?;

    toml::from_str(&content).map_err(|e| {
        Error::ConfigParse(format!(
            "Failed to parse config file {}: {e}",
            path.display()
        ))
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// ENVIRONMENT VARIABLE OVERRIDES (Immutable pattern)
// ═══════════════════════════════════════════════════════════════════════════

impl LockConfig {
    /// Apply `SCHEMA_LOCK_*` environment variable overrides
    ///
    /// # Errors
    ///
    /// Returns error if environment variable values are invalid
    pub fn apply_env_vars(self) -> Result<Self> {
        self.apply_env(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable source.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // SCHEMA_LOCK_DATABASE_URL
        if let Some(value) = lookup("SCHEMA_LOCK_DATABASE_URL") {
            if value.trim().is_empty() {
                return Err(Error::InvalidConfig(
                    "SCHEMA_LOCK_DATABASE_URL cannot be empty - unset the variable or provide a URL"
                        .to_string(),
                ));
            }
            self.database_url = value;
        }

        // SCHEMA_LOCK_TABLE
        if let Some(value) = lookup("SCHEMA_LOCK_TABLE") {
            self.table = TableName::parse(&value)?;
        }

        if let Some(value) = parse_u64(&lookup, "SCHEMA_LOCK_TIMEOUT_MS")? {
            self.timeout_ms = value;
        }
        if let Some(value) = parse_u64(&lookup, "SCHEMA_LOCK_CONNECT_TIMEOUT_MS")? {
            self.connect_timeout_ms = value;
        }
        if let Some(value) = parse_u64(&lookup, "SCHEMA_LOCK_POLL_MS")? {
            self.retry.poll_ms = value;
        }
        if let Some(value) = parse_u64(&lookup, "SCHEMA_LOCK_MAX_POLL_MS")? {
            self.retry.max_poll_ms = value;
        }

        Ok(self)
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<u64>> {
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|e| Error::InvalidConfig(format!("Invalid {name} value: {e}")))
        })
        .transpose()
}
