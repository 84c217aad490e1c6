//! `SQLite` implementation of the lock store using `SQLx`.
//!
//! Each store owns a pool capped at one connection, so a coordinator handle is
//! exactly one live database connection. The connection runs in WAL mode so the
//! winner's commit never waits on readers, and with `busy_timeout = 0` so that
//! a contended write fails with `SQLITE_BUSY` instead of blocking.

use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Connection, Sqlite, SqlitePool, Transaction,
};

use crate::{
    dialect::SqliteDialect,
    store::{LockStore, LockTransaction, StoreError},
};

/// Lock store backed by a single `SQLite` connection.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    dialect: SqliteDialect,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url`.
    ///
    /// `connect_busy_timeout` only applies while the connection is being set up
    /// (switching the journal to WAL can briefly contend with other processes).
    /// Once connected, lock attempts never wait.
    pub async fn connect(url: &str, connect_busy_timeout: Duration) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(connect_busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA busy_timeout = 0")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect_with(options)
            .await?;

        tracing::debug!(url, "opened sqlite lock store");
        Ok(Self {
            pool,
            dialect: SqliteDialect,
        })
    }

    /// Get the underlying connection pool
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl LockStore for SqliteStore {
    type Transaction = SqliteTransaction;
    type Dialect = SqliteDialect;

    fn dialect(&self) -> &SqliteDialect {
        &self.dialect
    }

    async fn begin(&self) -> Result<SqliteTransaction, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(SqliteTransaction(tx))
    }

    async fn settle(&self) -> Result<(), StoreError> {
        // A dropped transaction queues its rollback on the connection before the
        // connection goes back to the pool; a ping behind it waits for it to land.
        let mut conn = self.pool.acquire().await?;
        conn.ping().await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}

/// Open transaction on the store's connection. Rolls back when dropped.
pub struct SqliteTransaction(Transaction<'static, Sqlite>);

#[async_trait]
impl LockTransaction for SqliteTransaction {
    async fn execute(&mut self, sql: &str) -> Result<u64, StoreError> {
        let done = sqlx::query(sql).execute(&mut *self.0).await?;
        Ok(done.rows_affected())
    }

    async fn fetch_count(&mut self, sql: &str) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(&mut *self.0)
            .await?;
        Ok(count)
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.0.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.0.rollback().await?;
        Ok(())
    }
}
