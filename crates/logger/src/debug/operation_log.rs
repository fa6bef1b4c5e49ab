//! In-memory log of recently completed table operations

use chrono::{DateTime, Utc};
use dbcore_types::OperationKind;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

/// A single completed operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct OperationEntry {
    /// When the operation was issued
    timestamp: DateTime<Utc>,
    table: String,
    operation: OperationKind,
    /// Identifying token of the request (key, index, mutation type)
    summary: String,
    request: serde_json::Value,
    response: serde_json::Value,
    /// Duration in fractional milliseconds
    duration_ms: f64,
}

impl OperationEntry {
    /// Create an entry for a request that has not completed yet
    pub fn new(table: String, operation: OperationKind, summary: String, request: serde_json::Value) -> Self {
        Self {
            timestamp: Utc::now(),
            table,
            operation,
            summary,
            request,
            response: serde_json::Value::Null,
            duration_ms: 0.0,
        }
    }

    /// Record the response and how long the call took
    pub fn completed(mut self, response: serde_json::Value, duration_ms: f64) -> Self {
        self.response = response;
        self.duration_ms = duration_ms;
        self
    }
}

#[derive(Debug)]
struct LogState {
    entries: VecDeque<OperationEntry>,
    max_size: usize,
}

/// Thread-safe ring buffer for storing recent operations.
///
/// Clones share both the entries and the size limit.
#[derive(Clone)]
pub struct OperationLog {
    state: Arc<RwLock<LogState>>,
}

impl OperationLog {
    /// Create a new operation log with the specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(LogState {
                entries: VecDeque::with_capacity(max_size),
                max_size,
            })),
        }
    }

    /// Add an operation to the log
    pub fn push(&self, entry: OperationEntry) {
        if let Ok(mut state) = self.state.write() {
            // Remove oldest entry if at capacity
            let limit = state.max_size.max(1);
            while state.entries.len() >= limit {
                state.entries.pop_front();
            }
            state.entries.push_back(entry);
        }
    }

    /// Get all entries in the log (newest last)
    pub fn get_all(&self) -> Vec<OperationEntry> {
        if let Ok(state) = self.state.read() {
            state.entries.iter().cloned().collect()
        } else {
            Vec::new()
        }
    }

    /// Get the most recent N entries
    pub fn get_recent(&self, n: usize) -> Vec<OperationEntry> {
        if let Ok(state) = self.state.read() {
            let skip = state.entries.len().saturating_sub(n);
            state.entries.iter().skip(skip).cloned().collect()
        } else {
            Vec::new()
        }
    }

    /// Most recent entry for the given operation kind
    pub fn last_of(&self, operation: OperationKind) -> Option<OperationEntry> {
        self.state.read().ok().and_then(|state| {
            state
                .entries
                .iter()
                .rev()
                .find(|entry| entry.operation == operation)
                .cloned()
        })
    }

    pub fn clear(&self) {
        if let Ok(mut state) = self.state.write() {
            state.entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|state| state.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_size(&self) -> usize {
        self.state.read().map(|state| state.max_size).unwrap_or(0)
    }

    /// Update the maximum size of the log for every clone, dropping the
    /// oldest entries
    pub fn set_max_size(&self, new_size: usize) {
        if let Ok(mut state) = self.state.write() {
            state.max_size = new_size;
            while state.entries.len() > new_size {
                state.entries.pop_front();
            }
        }
    }
}

impl Default for OperationLog {
    fn default() -> Self {
        Self::new(50)
    }
}
