//! Connection capability consumed by the lock protocol.
//!
//! The coordinator only needs to begin a transaction, execute statements in it,
//! and commit or roll it back. Engine failures come back as [`StoreError`] with the
//! engine's own code so the dialect can classify them.

use async_trait::async_trait;
use thiserror::Error;

use crate::dialect::Dialect;

/// A failed store call, with the engine-reported code when there is one.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    code: Option<String>,
    message: String,
    #[source]
    source: Option<sqlx::Error>,
}

impl StoreError {
    pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Engine-specific code, e.g. an `SQLite` extended result code.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let code = err
            .as_database_error()
            .and_then(|db| db.code())
            .map(std::borrow::Cow::into_owned);
        Self {
            code,
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// One live connection to the database that hosts the lock table.
#[async_trait]
pub trait LockStore: Send + Sync {
    type Transaction: LockTransaction;
    type Dialect: Dialect;

    fn dialect(&self) -> &Self::Dialect;

    async fn begin(&self) -> Result<Self::Transaction, StoreError>;

    /// Wait until every abandoned transaction has been rolled back on the server.
    async fn settle(&self) -> Result<(), StoreError>;

    async fn close(&self) -> Result<(), StoreError>;
}

/// An open transaction. Dropping it without `commit` rolls it back.
#[async_trait]
pub trait LockTransaction: Send {
    /// Execute a statement and return the number of rows it affected.
    async fn execute(&mut self, sql: &str) -> Result<u64, StoreError>;

    /// Run a single-value `COUNT(*)` style query.
    async fn fetch_count(&mut self, sql: &str) -> Result<i64, StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}
