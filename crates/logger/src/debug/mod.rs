//! In-memory record of logged operations, for inspecting recent activity
//! without a tracing subscriber.

pub mod operation_log;

pub use operation_log::{OperationEntry, OperationLog};
