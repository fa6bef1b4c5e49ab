//! Shared vocabulary for dbcore middleware: operation kinds, request and
//! response payloads, and the downlevel table traits being wrapped.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub mod memory;
mod operation;
mod payload;
mod table;

pub use operation::*;
pub use payload::*;
pub use table::*;

/// Identity of the transaction a request runs in
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Create a fresh random transaction id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
