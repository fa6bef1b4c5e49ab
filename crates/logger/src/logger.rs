use dbcore_types::{DbCore, DbCoreTable, OperationKind, TransactionId};
use std::sync::Arc;
use tracing::debug;

use crate::callbacks::{LoggingCallbacks, LOG_TARGET};
use crate::config::LoggerConfig;
use crate::error::ConfigResult;
use crate::filter::FilterPolicy;
use crate::logged_table::LoggedTable;
use crate::transaction::{TransactionSummary, TransactionTracker};

/// A validated logging policy plus the callbacks it drives.
///
/// Cloning is cheap; clones share the policy, callbacks and transaction
/// tracker.
#[derive(Clone)]
pub struct TableLogger {
    policy: Arc<FilterPolicy>,
    callbacks: Arc<dyn LoggingCallbacks>,
    tracker: Option<TransactionTracker>,
}

impl TableLogger {
    /// Build a logger using the callback set selected by `config.log_type`
    pub fn new(config: LoggerConfig) -> ConfigResult<Self> {
        let callbacks = config.log_type.callbacks();
        Self::with_callbacks(config, callbacks)
    }

    /// Build a logger with a custom callback set. `config.log_type` is ignored.
    pub fn with_callbacks(
        config: LoggerConfig,
        callbacks: Arc<dyn LoggingCallbacks>,
    ) -> ConfigResult<Self> {
        let policy = FilterPolicy::from_config(&config)?;
        debug!(
            target: LOG_TARGET,
            ?policy,
            log_type = ?config.log_type,
            track_transactions = config.track_transactions,
            "table logger configured"
        );

        Ok(Self {
            policy: Arc::new(policy),
            callbacks,
            tracker: config.track_transactions.then(TransactionTracker::new),
        })
    }

    pub fn should_log(&self, table_name: &str, operation: OperationKind) -> bool {
        self.policy.should_log(table_name, operation)
    }

    pub fn policy(&self) -> &FilterPolicy {
        &self.policy
    }

    pub fn callbacks(&self) -> &dyn LoggingCallbacks {
        self.callbacks.as_ref()
    }

    /// The transaction tracker, when transaction tracking is enabled
    pub fn tracker(&self) -> Option<&TransactionTracker> {
        self.tracker.as_ref()
    }

    /// Decorate a single table
    pub fn wrap<T: DbCoreTable>(&self, table: T) -> LoggedTable<T> {
        LoggedTable::new(table, self.clone())
    }

    /// Decorate a whole database; every table it hands out is logged
    pub fn middleware<D: DbCore>(&self, db: D) -> LoggedDatabase<D> {
        LoggedDatabase {
            inner: db,
            logger: self.clone(),
        }
    }

    /// Report a finished transaction. Returns `None` when tracking is off or
    /// no logged operation ran in the transaction.
    pub fn complete_transaction(&self, transaction: &TransactionId) -> Option<TransactionSummary> {
        self.tracker.as_ref()?.complete(transaction)
    }

    /// Forget a transaction that will not complete. Returns whether it had
    /// pending operations.
    pub fn abandon_transaction(&self, transaction: &TransactionId) -> bool {
        self.tracker
            .as_ref()
            .map(|tracker| tracker.abandon(transaction))
            .unwrap_or(false)
    }
}

/// Database facade produced by [`TableLogger::middleware`]
pub struct LoggedDatabase<D> {
    inner: D,
    logger: TableLogger,
}

impl<D: DbCore> LoggedDatabase<D> {
    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn logger(&self) -> &TableLogger {
        &self.logger
    }

    pub fn complete_transaction(&self, transaction: &TransactionId) -> Option<TransactionSummary> {
        self.logger.complete_transaction(transaction)
    }

    pub fn abandon_transaction(&self, transaction: &TransactionId) -> bool {
        self.logger.abandon_transaction(transaction)
    }
}

impl<D: DbCore> DbCore for LoggedDatabase<D> {
    type Table = LoggedTable<D::Table>;

    fn table(&self, name: &str) -> anyhow::Result<Self::Table> {
        Ok(self.logger.wrap(self.inner.table(name)?))
    }

    fn table_names(&self) -> Vec<String> {
        self.inner.table_names()
    }
}
