//! Allow/deny evaluation over (table, operation) pairs

use dbcore_types::OperationKind;
use std::borrow::Borrow;
use std::collections::BTreeSet;

use crate::config::LoggerConfig;
use crate::error::{ConfigResult, ConfigurationError};

/// One dimension of the policy. Allow and deny are exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Rule<T: Ord> {
    Any,
    Only(BTreeSet<T>),
    Except(BTreeSet<T>),
}

impl<T: Ord + Clone> Rule<T> {
    fn new(
        allow: Option<&BTreeSet<T>>,
        deny: Option<&BTreeSet<T>>,
        conflict: ConfigurationError,
    ) -> ConfigResult<Self> {
        match (allow, deny) {
            (Some(_), Some(_)) => Err(conflict),
            (Some(allow), None) => Ok(Rule::Only(allow.clone())),
            (None, Some(deny)) => Ok(Rule::Except(deny.clone())),
            (None, None) => Ok(Rule::Any),
        }
    }

    fn admits<Q>(&self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self {
            Rule::Any => true,
            Rule::Only(allowed) => allowed.contains(item),
            Rule::Except(denied) => !denied.contains(item),
        }
    }
}

/// Decides whether a call on a table should produce log output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPolicy {
    tables: Rule<String>,
    operations: Rule<OperationKind>,
}

impl FilterPolicy {
    /// Validate the configured lists and build the policy
    pub fn from_config(config: &LoggerConfig) -> ConfigResult<Self> {
        let tables = Rule::new(
            config.table_white_list.as_ref(),
            config.tables_black_list.as_ref(),
            ConfigurationError::ConflictingTableLists,
        )?;
        let operations = Rule::new(
            config.operations_white_list.as_ref(),
            config.operations_black_list.as_ref(),
            ConfigurationError::ConflictingOperationLists,
        )?;
        Ok(Self { tables, operations })
    }

    /// A policy that logs everything
    pub fn allow_all() -> Self {
        Self {
            tables: Rule::Any,
            operations: Rule::Any,
        }
    }

    pub fn should_log(&self, table_name: &str, operation: OperationKind) -> bool {
        self.operations.admits(&operation) && self.tables.admits(table_name)
    }
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::allow_all()
    }
}
