//! Engine-specific knowledge: the statements the protocol runs and the lookup
//! from engine error codes to protocol signals.
//!
//! Swapping the backing database means supplying another [`Dialect`]; the
//! coordinator itself never looks at an engine code.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Identifier of the single marker row.
pub const MARKER_ID: i64 = 1;

/// Default lock table name.
pub const DEFAULT_TABLE: &str = "schema_lock";

/// Longest identifier accepted for the lock table.
const MAX_TABLE_LEN: usize = 63;

/// What an engine error code means to the lock protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The object being created already exists.
    Ignorable,
    /// Another connection holds the lock we asked for and we refused to wait.
    Busy,
    /// A uniqueness constraint rejected the row.
    Duplicate,
    /// Anything else; surfaces as a storage error.
    Unknown,
}

/// SQL the protocol runs, rendered for one lock table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statements {
    pub create_table: String,
    pub lock_table: String,
    pub insert_marker: String,
    pub delete_marker: String,
    pub table_exists: String,
    pub count_markers: String,
}

pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// Map an engine-reported code to a protocol signal.
    fn classify(&self, code: &str) -> Signal;

    fn statements(&self, table: &TableName) -> Statements;
}

/// `SQLite` in WAL mode with `busy_timeout = 0`.
///
/// `SQLite` has no `LOCK TABLE`; the gate is a write statement that touches no rows.
/// Starting it takes the database write lock, and with a zero busy timeout a
/// second writer fails at once with `SQLITE_BUSY` instead of queuing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn classify(&self, code: &str) -> Signal {
        // Extended result codes, as reported by sqlite3_extended_errcode.
        match code {
            // BUSY, LOCKED, BUSY_RECOVERY, LOCKED_SHAREDCACHE, BUSY_SNAPSHOT, BUSY_TIMEOUT
            "5" | "6" | "261" | "262" | "517" | "773" => Signal::Busy,
            // CONSTRAINT, CONSTRAINT_PRIMARYKEY, CONSTRAINT_UNIQUE
            "19" | "1555" | "2067" => Signal::Duplicate,
            _ => Signal::Unknown,
        }
    }

    fn statements(&self, table: &TableName) -> Statements {
        Statements {
            create_table: format!("CREATE TABLE IF NOT EXISTS {table} (id INTEGER PRIMARY KEY)"),
            lock_table: format!("DELETE FROM {table} WHERE 0"),
            insert_marker: format!("INSERT INTO {table} (id) VALUES ({MARKER_ID})"),
            delete_marker: format!("DELETE FROM {table} WHERE id = {MARKER_ID}"),
            table_exists: format!(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '{table}'"
            ),
            count_markers: format!("SELECT COUNT(*) FROM {table} WHERE id = {MARKER_ID}"),
        }
    }
}

/// Name of the lock table, validated as a plain SQL identifier.
///
/// The name is interpolated into statements, so only `[A-Za-z_][A-Za-z0-9_]*`
/// is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    pub fn parse(name: &str) -> Result<Self> {
        let mut chars = name.chars();
        let starts_well = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !starts_well {
            return Err(Error::InvalidConfig(format!(
                "lock table name '{name}' must start with a letter or underscore"
            )));
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::InvalidConfig(format!(
                "lock table name '{name}' may only contain letters, digits and underscores"
            )));
        }
        if name.len() > MAX_TABLE_LEN {
            return Err(Error::InvalidConfig(format!(
                "lock table name is longer than {MAX_TABLE_LEN} characters"
            )));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self(DEFAULT_TABLE.to_string())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TableName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<TableName> for String {
    fn from(value: TableName) -> Self {
        value.0
    }
}
