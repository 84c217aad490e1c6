//! Schema lock coordinator.
//!
//! A [`Coordinator`] is one participant in the lock protocol. It owns one
//! connection and a local hint of whether it holds the lock. The hint only
//! short-circuits a re-acquire from the same handle; the marker row in the
//! database is the one source of truth.
//!
//! Acquire runs, in one transaction: create the lock table if absent, take the
//! non-waiting write gate on it, insert the marker row, commit. Release takes
//! the same gate and deletes the marker row. Any contention signal along the way
//! becomes [`Error::AlreadyLocked`] and the transaction is rolled back.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

use std::{future::Future, time::Duration};

use serde::Serialize;
use strum::Display;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::LockConfig,
    dialect::{Dialect, Signal, Statements, TableName},
    sqlite::SqliteStore,
    store::{LockStore, LockTransaction, StoreError},
    Error, Operation, Result, Step,
};

/// Longest wait for an abandoned transaction's rollback once a deadline has expired.
pub const SETTLE_LIMIT: Duration = Duration::from_secs(1);

/// What this handle last knew about its own ownership of the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LockState {
    /// Nothing observed yet, or the last commit's outcome is unknown.
    Unknown,
    Unlocked,
    /// This handle committed the marker row.
    Locked,
}

/// Lock table state as read from the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LockStatus {
    Locked,
    Unlocked,
}

/// One participant in the schema lock protocol.
///
/// Operations on one handle are serialized by an internal mutex, so a handle
/// may be shared behind an `Arc`. Separate handles coordinate only through the
/// database.
pub struct Coordinator<S: LockStore = SqliteStore> {
    store: S,
    table: TableName,
    sql: Statements,
    state: Mutex<LockState>,
}

impl Coordinator<SqliteStore> {
    /// Open a handle on the database and lock table named by `config`.
    pub async fn connect(config: &LockConfig) -> Result<Self> {
        let store = SqliteStore::connect(&config.database_url, config.connect_timeout())
            .await
            .map_err(|e| {
                Error::storage(Operation::Connect, Step::Connect, config.table.as_str(), e)
            })?;
        Ok(Self::new(store, config.table.clone()))
    }
}

impl<S: LockStore> Coordinator<S> {
    pub fn new(store: S, table: TableName) -> Self {
        let sql = store.dialect().statements(&table);
        Self {
            store,
            table,
            sql,
            state: Mutex::new(LockState::Unknown),
        }
    }

    pub const fn table(&self) -> &TableName {
        &self.table
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Current local hint. Waits for an in-flight operation on this handle.
    pub async fn state(&self) -> LockState {
        *self.state.lock().await
    }

    /// Claim the lock.
    ///
    /// Returns [`Error::AlreadyLocked`] when any other participant holds it, and
    /// also when this handle already does: the lock is not re-entrant.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn acquire(&self, deadline: Option<Duration>) -> Result<()> {
        let mut state = self.state.lock().await;
        if *state == LockState::Locked {
            debug!("lock already held by this handle");
            return Err(Error::already_locked(self.table.as_str()));
        }

        let outcome = self
            .bounded(Operation::Acquire, deadline, self.claim())
            .await;

        *state = match &outcome {
            Ok(()) => LockState::Locked,
            Err(Error::Indeterminate { .. } | Error::DeadlineExceeded { .. }) => {
                LockState::Unknown
            }
            Err(_) => LockState::Unlocked,
        };
        match &outcome {
            Ok(()) => info!("schema lock acquired"),
            Err(err) if err.is_already_locked() => debug!("schema lock is held elsewhere"),
            Err(err) => warn!(error = %err, "schema lock acquire failed"),
        }
        outcome
    }

    /// Give the lock up. Releasing an unlocked table is a no-op.
    ///
    /// Returns [`Error::AlreadyLocked`] when another participant is mid-operation
    /// on the lock table and the gate cannot be taken without waiting.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn release(&self, deadline: Option<Duration>) -> Result<()> {
        let mut state = self.state.lock().await;

        let outcome = self
            .bounded(Operation::Release, deadline, self.discard())
            .await;

        match &outcome {
            Ok(()) => {
                *state = LockState::Unlocked;
                info!("schema lock released");
            }
            Err(Error::Indeterminate { .. } | Error::DeadlineExceeded { .. }) => {
                *state = LockState::Unknown;
            }
            Err(_) => {}
        }
        outcome
    }

    /// Read whether anybody holds the lock, without taking the gate.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn status(&self, deadline: Option<Duration>) -> Result<LockStatus> {
        let mut state = self.state.lock().await;

        let outcome = self
            .bounded(Operation::Status, deadline, self.probe())
            .await;

        if matches!(outcome, Ok(LockStatus::Unlocked)) {
            *state = LockState::Unlocked;
        }
        outcome
    }

    /// Release the connection. The lock itself is left as it is.
    pub async fn close(self) -> Result<()> {
        self.store
            .close()
            .await
            .map_err(|e| Error::storage(Operation::Close, Step::Close, self.table.as_str(), e))
    }

    async fn claim(&self) -> Result<()> {
        let mut tx = self.begin(Operation::Acquire).await?;
        if let Err(err) = self.insert_marker(&mut tx).await {
            abandon(tx).await;
            return Err(err);
        }
        self.commit(Operation::Acquire, tx).await
    }

    async fn insert_marker(&self, tx: &mut S::Transaction) -> Result<()> {
        const OP: Operation = Operation::Acquire;

        if let Err(err) = tx.execute(&self.sql.create_table).await {
            match self.classify(&err) {
                Signal::Ignorable => debug!("lock table already exists"),
                // someone else holds the write gate while the table is being created
                Signal::Busy => return Err(Error::already_locked(self.table.as_str())),
                Signal::Duplicate | Signal::Unknown => {
                    return Err(self.failed(OP, Step::CreateTable, err));
                }
            }
        }

        self.take_gate(OP, tx).await?;

        match tx.execute(&self.sql.insert_marker).await {
            Ok(_) => Ok(()),
            Err(err) => match self.classify(&err) {
                Signal::Duplicate | Signal::Busy => {
                    Err(Error::already_locked(self.table.as_str()))
                }
                Signal::Ignorable | Signal::Unknown => {
                    Err(self.failed(OP, Step::InsertMarker, err))
                }
            },
        }
    }

    async fn discard(&self) -> Result<()> {
        let mut tx = self.begin(Operation::Release).await?;
        if let Err(err) = self.delete_marker(&mut tx).await {
            abandon(tx).await;
            return Err(err);
        }
        self.commit(Operation::Release, tx).await
    }

    async fn delete_marker(&self, tx: &mut S::Transaction) -> Result<()> {
        const OP: Operation = Operation::Release;

        let tables = tx
            .fetch_count(&self.sql.table_exists)
            .await
            .map_err(|e| self.failed(OP, Step::ProbeTable, e))?;
        if tables == 0 {
            debug!("lock table does not exist, nothing to release");
            return Ok(());
        }

        self.take_gate(OP, tx).await?;

        match tx.execute(&self.sql.delete_marker).await {
            Ok(rows) => {
                debug!(rows, "marker row deleted");
                Ok(())
            }
            Err(err) => match self.classify(&err) {
                Signal::Busy => Err(Error::already_locked(self.table.as_str())),
                _ => Err(self.failed(OP, Step::DeleteMarker, err)),
            },
        }
    }

    async fn probe(&self) -> Result<LockStatus> {
        let mut tx = self.begin(Operation::Status).await?;
        let status = self.count_markers(&mut tx).await;
        // read-only, nothing to keep
        abandon(tx).await;
        status
    }

    async fn count_markers(&self, tx: &mut S::Transaction) -> Result<LockStatus> {
        const OP: Operation = Operation::Status;

        let tables = tx
            .fetch_count(&self.sql.table_exists)
            .await
            .map_err(|e| self.failed(OP, Step::ProbeTable, e))?;
        if tables == 0 {
            return Ok(LockStatus::Unlocked);
        }

        let markers = tx
            .fetch_count(&self.sql.count_markers)
            .await
            .map_err(|e| self.failed(OP, Step::CountMarkers, e))?;
        Ok(if markers > 0 {
            LockStatus::Locked
        } else {
            LockStatus::Unlocked
        })
    }

    /// Exclusive, non-waiting lock on the lock table.
    async fn take_gate(&self, operation: Operation, tx: &mut S::Transaction) -> Result<()> {
        match tx.execute(&self.sql.lock_table).await {
            Ok(_) => Ok(()),
            Err(err) => match self.classify(&err) {
                Signal::Busy => Err(Error::already_locked(self.table.as_str())),
                _ => Err(self.failed(operation, Step::LockTable, err)),
            },
        }
    }

    async fn begin(&self, operation: Operation) -> Result<S::Transaction> {
        self.store
            .begin()
            .await
            .map_err(|e| self.failed(operation, Step::Begin, e))
    }

    async fn commit(&self, operation: Operation, tx: S::Transaction) -> Result<()> {
        tx.commit().await.map_err(|source| Error::Indeterminate {
            operation,
            table: self.table.to_string(),
            source,
        })
    }

    /// Run `work` under the caller's deadline.
    ///
    /// On expiry `work` is dropped together with the transaction it owns, which
    /// rolls the transaction back; `settle` waits for that rollback to land.
    async fn bounded<T>(
        &self,
        operation: Operation,
        deadline: Option<Duration>,
        work: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let Some(limit) = deadline else {
            return work.await;
        };

        let outcome = tokio::time::timeout(limit, work).await;
        match outcome {
            Ok(result) => result,
            Err(_elapsed) => {
                warn!(%operation, ?limit, "deadline expired, transaction rolled back");
                match tokio::time::timeout(SETTLE_LIMIT, self.store.settle()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => warn!(error = %err, "connection did not settle after deadline"),
                    Err(_elapsed) => {
                        warn!(limit = ?SETTLE_LIMIT, "rollback still pending after deadline");
                    }
                }
                Err(Error::DeadlineExceeded { operation, limit })
            }
        }
    }

    fn classify(&self, err: &StoreError) -> Signal {
        err.code()
            .map_or(Signal::Unknown, |code| self.store.dialect().classify(code))
    }

    fn failed(&self, operation: Operation, step: Step, err: StoreError) -> Error {
        Error::storage(operation, step, self.table.as_str(), err)
    }
}

/// Roll back after a failed step. A failed rollback leaves nothing to undo.
async fn abandon<T: LockTransaction>(tx: T) {
    if let Err(err) = tx.rollback().await {
        warn!(error = %err, "rollback failed");
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex as StdMutex, PoisonError},
    };

    use async_trait::async_trait;

    use super::*;
    use crate::dialect::SqliteDialect;

    /// Symbolic codes used by the scripted store.
    struct ScriptedDialect;

    impl Dialect for ScriptedDialect {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn classify(&self, code: &str) -> Signal {
            match code {
                "exists" => Signal::Ignorable,
                "busy" => Signal::Busy,
                "unique" => Signal::Duplicate,
                _ => Signal::Unknown,
            }
        }

        fn statements(&self, table: &TableName) -> Statements {
            SqliteDialect.statements(table)
        }
    }

    #[derive(Default)]
    struct Script {
        failures: HashMap<String, String>,
        stalls: Vec<String>,
        fail_begin: bool,
        fail_commit: bool,
        stall_settle: bool,
        table_exists: bool,
        markers: i64,
        log: Vec<String>,
    }

    #[derive(Clone, Default)]
    struct ScriptedStore {
        script: Arc<StdMutex<Script>>,
    }

    impl ScriptedStore {
        fn with<R>(&self, f: impl FnOnce(&mut Script) -> R) -> R {
            with_script(&self.script, f)
        }

        fn fail(&self, sql: &str, code: &str) {
            self.with(|s| {
                s.failures.insert(sql.to_string(), code.to_string());
            });
        }

        fn log(&self) -> Vec<String> {
            self.with(|s| s.log.clone())
        }
    }

    fn with_script<R>(script: &StdMutex<Script>, f: impl FnOnce(&mut Script) -> R) -> R {
        let mut guard = script.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    struct ScriptedTx {
        script: Arc<StdMutex<Script>>,
        finished: bool,
    }

    impl Drop for ScriptedTx {
        fn drop(&mut self) {
            if !self.finished {
                with_script(&self.script, |s| s.log.push("dropped".into()));
            }
        }
    }

    #[async_trait]
    impl LockTransaction for ScriptedTx {
        async fn execute(&mut self, sql: &str) -> std::result::Result<u64, StoreError> {
            let (failure, stall) = with_script(&self.script, |s| {
                s.log.push(sql.to_string());
                (
                    s.failures.get(sql).cloned(),
                    s.stalls.iter().any(|stalled| stalled == sql),
                )
            });
            if stall {
                std::future::pending::<()>().await;
            }
            match failure {
                Some(code) => Err(StoreError::new(Some(code), format!("scripted: {sql}"))),
                None => Ok(1),
            }
        }

        async fn fetch_count(&mut self, sql: &str) -> std::result::Result<i64, StoreError> {
            let sqlite = SqliteDialect.statements(&TableName::default());
            with_script(&self.script, |s| {
                s.log.push(sql.to_string());
                if let Some(code) = s.failures.get(sql) {
                    return Err(StoreError::new(Some(code.clone()), "scripted"));
                }
                if sql == sqlite.table_exists {
                    Ok(i64::from(s.table_exists))
                } else {
                    Ok(s.markers)
                }
            })
        }

        async fn commit(mut self) -> std::result::Result<(), StoreError> {
            self.finished = true;
            with_script(&self.script, |s| {
                s.log.push("commit".into());
                if s.fail_commit {
                    Err(StoreError::new(Some("10".into()), "disk I/O error"))
                } else {
                    Ok(())
                }
            })
        }

        async fn rollback(mut self) -> std::result::Result<(), StoreError> {
            self.finished = true;
            with_script(&self.script, |s| s.log.push("rollback".into()));
            Ok(())
        }
    }

    #[async_trait]
    impl LockStore for ScriptedStore {
        type Transaction = ScriptedTx;
        type Dialect = ScriptedDialect;

        fn dialect(&self) -> &ScriptedDialect {
            &ScriptedDialect
        }

        async fn begin(&self) -> std::result::Result<ScriptedTx, StoreError> {
            let refuse = self.with(|s| {
                s.log.push("begin".into());
                s.fail_begin
            });
            if refuse {
                return Err(StoreError::new(None, "connection refused"));
            }
            Ok(ScriptedTx {
                script: Arc::clone(&self.script),
                finished: false,
            })
        }

        async fn settle(&self) -> std::result::Result<(), StoreError> {
            let stall = self.with(|s| {
                s.log.push("settle".into());
                s.stall_settle
            });
            if stall {
                std::future::pending::<()>().await;
            }
            Ok(())
        }

        async fn close(&self) -> std::result::Result<(), StoreError> {
            self.with(|s| s.log.push("close".into()));
            Ok(())
        }
    }

    fn sql() -> Statements {
        SqliteDialect.statements(&TableName::default())
    }

    fn setup() -> (ScriptedStore, Coordinator<ScriptedStore>) {
        let store = ScriptedStore::default();
        let coordinator = Coordinator::new(store.clone(), TableName::default());
        (store, coordinator)
    }

    #[tokio::test]
    async fn test_acquire_runs_protocol_in_order() -> Result<()> {
        let (store, coordinator) = setup();
        let sql = sql();

        coordinator.acquire(None).await?;

        assert_eq!(
            store.log(),
            vec![
                "begin".to_string(),
                sql.create_table,
                sql.lock_table,
                sql.insert_marker,
                "commit".to_string(),
            ]
        );
        assert_eq!(coordinator.state().await, LockState::Locked);
        Ok(())
    }

    #[tokio::test]
    async fn test_busy_gate_is_already_locked_and_rolls_back() {
        let (store, coordinator) = setup();
        store.fail(&sql().lock_table, "busy");

        let result = coordinator.acquire(None).await;

        assert!(matches!(result, Err(Error::AlreadyLocked { .. })));
        let log = store.log();
        assert_eq!(log.last().map(String::as_str), Some("rollback"));
        assert!(!log.contains(&sql().insert_marker));
        assert!(!log.contains(&"commit".to_string()));
        assert_eq!(coordinator.state().await, LockState::Unlocked);
    }

    #[tokio::test]
    async fn test_duplicate_marker_is_already_locked() {
        let (store, coordinator) = setup();
        store.fail(&sql().insert_marker, "unique");

        let result = coordinator.acquire(None).await;

        assert!(matches!(result, Err(Error::AlreadyLocked { .. })));
        assert_eq!(store.log().last().map(String::as_str), Some("rollback"));
    }

    #[tokio::test]
    async fn test_busy_insert_is_already_locked() {
        let (store, coordinator) = setup();
        store.fail(&sql().insert_marker, "busy");

        let result = coordinator.acquire(None).await;

        assert!(matches!(result, Err(Error::AlreadyLocked { .. })));
    }

    #[tokio::test]
    async fn test_existing_table_signal_is_ignored() -> Result<()> {
        let (store, coordinator) = setup();
        store.fail(&sql().create_table, "exists");

        coordinator.acquire(None).await?;

        let log = store.log();
        assert!(log.contains(&sql().insert_marker));
        assert_eq!(log.last().map(String::as_str), Some("commit"));
        Ok(())
    }

    #[tokio::test]
    async fn test_busy_create_is_already_locked() {
        let (store, coordinator) = setup();
        store.fail(&sql().create_table, "busy");

        let result = coordinator.acquire(None).await;

        assert!(matches!(result, Err(Error::AlreadyLocked { .. })));
        assert!(!store.log().contains(&sql().lock_table));
    }

    #[tokio::test]
    async fn test_unclassified_create_failure_is_storage_error() {
        let (store, coordinator) = setup();
        store.fail(&sql().create_table, "13");

        let result = coordinator.acquire(None).await;

        assert!(matches!(
            result,
            Err(Error::Storage {
                operation: Operation::Acquire,
                step: Step::CreateTable,
                ..
            })
        ));
        assert_eq!(store.log().last().map(String::as_str), Some("rollback"));
    }

    #[tokio::test]
    async fn test_unclassified_gate_failure_is_storage_error() {
        let (store, coordinator) = setup();
        store.fail(&sql().lock_table, "1");

        let result = coordinator.acquire(None).await;

        assert!(matches!(
            result,
            Err(Error::Storage {
                step: Step::LockTable,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_error_without_code_is_storage_error() {
        let (store, coordinator) = setup();
        store.with(|s| s.fail_begin = true);

        let result = coordinator.acquire(None).await;

        assert!(matches!(
            result,
            Err(Error::Storage {
                step: Step::Begin,
                ..
            })
        ));
        assert_eq!(store.log(), vec!["begin".to_string()]);
    }

    #[tokio::test]
    async fn test_commit_failure_is_indeterminate() {
        let (store, coordinator) = setup();
        store.with(|s| s.fail_commit = true);

        let result = coordinator.acquire(None).await;

        assert!(matches!(
            result,
            Err(Error::Indeterminate {
                operation: Operation::Acquire,
                ..
            })
        ));
        assert_eq!(coordinator.state().await, LockState::Unknown);
    }

    #[tokio::test]
    async fn test_reacquire_short_circuits_without_statements() -> Result<()> {
        let (store, coordinator) = setup();
        coordinator.acquire(None).await?;
        let before = store.log().len();

        let result = coordinator.acquire(None).await;

        assert!(matches!(result, Err(Error::AlreadyLocked { .. })));
        assert_eq!(store.log().len(), before);
        assert_eq!(coordinator.state().await, LockState::Locked);
        Ok(())
    }

    #[tokio::test]
    async fn test_release_without_table_is_noop() -> Result<()> {
        let (store, coordinator) = setup();

        coordinator.release(None).await?;

        assert_eq!(
            store.log(),
            vec![
                "begin".to_string(),
                sql().table_exists,
                "commit".to_string()
            ]
        );
        assert_eq!(coordinator.state().await, LockState::Unlocked);
        Ok(())
    }

    #[tokio::test]
    async fn test_release_deletes_marker_under_gate() -> Result<()> {
        let (store, coordinator) = setup();
        store.with(|s| s.table_exists = true);
        coordinator.acquire(None).await?;
        let before = store.log().len();

        coordinator.release(None).await?;

        let sql = sql();
        assert_eq!(
            store.log()[before..].to_vec(),
            vec![
                "begin".to_string(),
                sql.table_exists,
                sql.lock_table,
                sql.delete_marker,
                "commit".to_string(),
            ]
        );
        assert_eq!(coordinator.state().await, LockState::Unlocked);
        Ok(())
    }

    #[tokio::test]
    async fn test_busy_release_keeps_ownership_hint() -> Result<()> {
        let (store, coordinator) = setup();
        store.with(|s| s.table_exists = true);
        coordinator.acquire(None).await?;
        store.fail(&sql().lock_table, "busy");

        let result = coordinator.release(None).await;

        assert!(matches!(result, Err(Error::AlreadyLocked { .. })));
        assert_eq!(coordinator.state().await, LockState::Locked);
        assert_eq!(store.log().last().map(String::as_str), Some("rollback"));
        Ok(())
    }

    #[tokio::test]
    async fn test_deadline_drops_stalled_transaction() {
        let (store, coordinator) = setup();
        store.with(|s| s.stalls.push(sql().insert_marker));

        let result = coordinator
            .acquire(Some(Duration::from_millis(20)))
            .await;

        assert!(matches!(
            result,
            Err(Error::DeadlineExceeded {
                operation: Operation::Acquire,
                ..
            })
        ));
        let log = store.log();
        assert!(!log.contains(&"commit".to_string()));
        let dropped = log.iter().position(|entry| entry == "dropped");
        let settled = log.iter().position(|entry| entry == "settle");
        assert!(dropped.is_some(), "transaction was not dropped: {log:?}");
        assert!(dropped < settled, "settle ran before rollback: {log:?}");
        assert_eq!(coordinator.state().await, LockState::Unknown);
    }

    #[tokio::test]
    async fn test_stuck_settle_does_not_outlive_its_limit() {
        let (store, coordinator) = setup();
        store.with(|s| {
            s.stalls.push(sql().insert_marker);
            s.stall_settle = true;
        });

        let started = std::time::Instant::now();
        let result = coordinator
            .acquire(Some(Duration::from_millis(20)))
            .await;

        assert!(matches!(result, Err(Error::DeadlineExceeded { .. })));
        let elapsed = started.elapsed();
        assert!(elapsed >= SETTLE_LIMIT, "returned before settling: {elapsed:?}");
        assert!(
            elapsed < SETTLE_LIMIT + Duration::from_secs(2),
            "settle was not bounded: {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn test_status_reads_marker() -> Result<()> {
        let (store, coordinator) = setup();
        assert_eq!(coordinator.status(None).await?, LockStatus::Unlocked);
        assert_eq!(coordinator.state().await, LockState::Unlocked);

        store.with(|s| {
            s.table_exists = true;
            s.markers = 1;
        });
        assert_eq!(coordinator.status(None).await?, LockStatus::Locked);
        assert_eq!(store.log().last().map(String::as_str), Some("rollback"));
        Ok(())
    }

    #[tokio::test]
    async fn test_status_probe_failure_is_storage_error() {
        let (store, coordinator) = setup();
        store.fail(&sql().table_exists, "11");

        let result = coordinator.status(None).await;

        assert!(matches!(
            result,
            Err(Error::Storage {
                operation: Operation::Status,
                step: Step::ProbeTable,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_close_does_not_touch_lock() -> Result<()> {
        let (store, coordinator) = setup();
        coordinator.acquire(None).await?;
        let before = store.log().len();

        coordinator.close().await?;

        assert_eq!(store.log()[before..].to_vec(), vec!["close".to_string()]);
        Ok(())
    }
}
