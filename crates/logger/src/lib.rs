//! Request/response logging middleware for dbcore tables.
//!
//! A [`TableLogger`] is built once from a [`LoggerConfig`]. It decides per
//! (table, operation) whether a call is logged, runs the request phase of
//! its [`LoggingCallbacks`] before delegating, and the response phase with
//! the elapsed time once the call succeeds. Results and errors of the
//! wrapped table are passed through unchanged.
//!
//! ```no_run
//! use dbcore_logger::{LoggerConfig, TableLogger};
//! use dbcore_types::{memory::MemoryDatabase, DbCore, DbCoreTable, GetRequest, OperationKind};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let logger = TableLogger::new(
//!     LoggerConfig::default().with_operations_black_list([OperationKind::OpenCursor]),
//! )?;
//! let db = logger.middleware(MemoryDatabase::new(["users"]));
//! let users = db.table("users")?;
//! let _user = users.get(GetRequest::new("user_1".into())).await?;
//! # Ok(())
//! # }
//! ```

pub mod callbacks;
pub mod config;
pub mod debug;
pub mod error;
pub mod filter;
mod logged_table;
mod logger;
pub mod transaction;

pub use callbacks::{
    LoggingCallbacks, MinimalCallbacks, RecordingCallbacks, RequestContext, ResponseLogger,
    ResponseTiming, VerboseCallbacks,
};
pub use config::{LogType, LoggerConfig};
pub use error::{ConfigResult, ConfigurationError};
pub use filter::FilterPolicy;
pub use logged_table::LoggedTable;
pub use logger::{LoggedDatabase, TableLogger};
pub use transaction::{TransactionSummary, TransactionTracker};
