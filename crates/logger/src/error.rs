use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Raised while building a logger; no logger is produced when this occurs.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("`tableWhiteList` and `tablesBlackList` cannot both be configured")]
    ConflictingTableLists,

    #[error("`operationsWhiteList` and `operationsBlackList` cannot both be configured")]
    ConflictingOperationLists,

    #[error("Invalid logger configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
