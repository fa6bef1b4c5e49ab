//! Logger configuration

use dbcore_types::OperationKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::str::FromStr;
use std::sync::Arc;

use crate::callbacks::{LoggingCallbacks, MinimalCallbacks, VerboseCallbacks};
use crate::error::ConfigResult;

/// Built-in callback set selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum LogType {
    /// Grouped request and response entries with full payloads
    #[default]
    Default,
    /// One line per completed operation
    Minimal,
}

impl LogType {
    pub fn callbacks(&self) -> Arc<dyn LoggingCallbacks> {
        match self {
            LogType::Default => Arc::new(VerboseCallbacks),
            LogType::Minimal => Arc::new(MinimalCallbacks),
        }
    }
}

impl FromStr for LogType {
    type Err = Infallible;

    /// Unrecognized names select [`LogType::Default`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => LogType::Minimal,
            _ => LogType::Default,
        })
    }
}

impl From<String> for LogType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(log_type) => log_type,
            Err(never) => match never {},
        }
    }
}

/// Which tables and operations get logged, and how.
///
/// Each dimension takes either an allow list or a deny list, never both.
/// A list that is present counts as configured even when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_white_list: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables_black_list: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operations_white_list: Option<BTreeSet<OperationKind>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operations_black_list: Option<BTreeSet<OperationKind>>,
    pub log_type: LogType,
    /// Group logged operations per transaction and summarize on completion
    pub track_transactions: bool,
}

impl LoggerConfig {
    /// Parse a configuration from its JSON form
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_table_white_list<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table_white_list = Some(tables.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_tables_black_list<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables_black_list = Some(tables.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_operations_white_list<I>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = OperationKind>,
    {
        self.operations_white_list = Some(operations.into_iter().collect());
        self
    }

    pub fn with_operations_black_list<I>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = OperationKind>,
    {
        self.operations_black_list = Some(operations.into_iter().collect());
        self
    }

    pub fn with_log_type(mut self, log_type: LogType) -> Self {
        self.log_type = log_type;
        self
    }

    /// Group logged operations per transaction. Pending entries are kept
    /// until the host calls `TableLogger::complete_transaction` or
    /// `TableLogger::abandon_transaction` for the id.
    pub fn with_transaction_tracking(mut self, enabled: bool) -> Self {
        self.track_transactions = enabled;
        self
    }
}
