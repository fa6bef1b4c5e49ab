//! Per-transaction grouping of logged operations.
//!
//! The tracker only keys entries by [`TransactionId`]; it never holds the
//! transaction itself. Entries are removed when the transaction completes or
//! is abandoned.

use chrono::{DateTime, Utc};
use dbcore_types::{Request, TransactionId};
use derive_getters::Getters;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::callbacks::LOG_TARGET;

/// Key identifying one operation within a transaction, e.g. `users:get:"user_1"`
pub fn operation_key(table_name: &str, request: &Request<'_>) -> String {
    format!("{}:{}:{}", table_name, request.kind(), request.summary())
}

#[derive(Debug, Clone)]
struct PendingTransaction {
    first_seen: DateTime<Utc>,
    operations: Vec<String>,
}

/// What a transaction did, reported when it completes
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct TransactionSummary {
    transaction: TransactionId,
    first_seen: DateTime<Utc>,
    completed: DateTime<Utc>,
    /// Operation keys in the order the operations finished
    operations: Vec<String>,
}

/// Accumulates operation keys per transaction until completion
#[derive(Clone, Default)]
pub struct TransactionTracker {
    pending: Arc<Mutex<HashMap<TransactionId, PendingTransaction>>>,
}

impl TransactionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, transaction: &TransactionId, key: String) {
        if let Ok(mut pending) = self.pending.lock() {
            pending
                .entry(transaction.clone())
                .or_insert_with(|| PendingTransaction {
                    first_seen: Utc::now(),
                    operations: Vec::new(),
                })
                .operations
                .push(key);
        }
    }

    /// Close a transaction, emitting and returning its summary.
    ///
    /// Returns `None` when nothing was recorded for the transaction.
    pub fn complete(&self, transaction: &TransactionId) -> Option<TransactionSummary> {
        let finished = self.pending.lock().ok()?.remove(transaction)?;
        let summary = TransactionSummary {
            transaction: transaction.clone(),
            first_seen: finished.first_seen,
            completed: Utc::now(),
            operations: finished.operations,
        };

        info!(
            target: LOG_TARGET,
            transaction = %summary.transaction,
            operations = summary.operations.len(),
            "Transaction {} completed: {}",
            summary.transaction,
            summary.operations.join(", ")
        );

        Some(summary)
    }

    /// Drop what was recorded for a transaction that will never complete,
    /// such as an aborted one. Returns whether anything was pending.
    pub fn abandon(&self, transaction: &TransactionId) -> bool {
        let removed = self
            .pending
            .lock()
            .map(|mut pending| pending.remove(transaction).is_some())
            .unwrap_or(false);
        if removed {
            debug!(target: LOG_TARGET, transaction = %transaction, "transaction abandoned");
        }
        removed
    }

    /// Number of transactions with recorded operations that have not completed
    pub fn pending(&self) -> usize {
        self.pending.lock().map(|pending| pending.len()).unwrap_or(0)
    }

    /// Operation keys recorded so far for an open transaction
    pub fn operations(&self, transaction: &TransactionId) -> Vec<String> {
        self.pending
            .lock()
            .ok()
            .and_then(|pending| pending.get(transaction).map(|p| p.operations.clone()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbcore_types::{CountRequest, DbCoreQuery, GetRequest, KeyRange};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_operation_key() {
        let get = GetRequest::new(json!("user_1"));
        assert_eq!(operation_key("users", &Request::Get(&get)), "users:get:\"user_1\"");

        let count = CountRequest::new(DbCoreQuery::primary(KeyRange::all()));
        assert_eq!(operation_key("users", &Request::Count(&count)), "users:count::id");
    }

    #[test]
    fn test_tracker_groups_by_transaction() {
        let tracker = TransactionTracker::new();
        let a = TransactionId::new();
        let b = TransactionId::new();

        tracker.record(&a, "users:get:1".to_string());
        tracker.record(&b, "orders:count::id".to_string());
        tracker.record(&a, "users:mutate:put(1)".to_string());
        assert_eq!(tracker.pending(), 2);
        assert_eq!(tracker.operations(&a).len(), 2);

        let summary = tracker.complete(&a).unwrap();
        assert_eq!(summary.transaction(), &a);
        assert_eq!(
            summary.operations(),
            &vec!["users:get:1".to_string(), "users:mutate:put(1)".to_string()]
        );
        assert!(summary.completed() >= summary.first_seen());
        assert_eq!(tracker.pending(), 1);

        assert!(tracker.complete(&a).is_none());
    }

    #[test]
    fn test_abandon_drops_pending_operations() {
        let tracker = TransactionTracker::new();
        let aborted = TransactionId::new();
        let get = GetRequest::new(json!("user_1"));
        tracker.record(&aborted, operation_key("users", &Request::Get(&get)));
        assert_eq!(tracker.pending(), 1);

        assert!(tracker.abandon(&aborted));
        assert_eq!(tracker.pending(), 0);
        assert!(tracker.operations(&aborted).is_empty());
        assert!(tracker.complete(&aborted).is_none());
        assert!(!tracker.abandon(&aborted));
    }
}
