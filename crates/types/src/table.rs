use async_trait::async_trait;
use serde_json::Value;

use crate::payload::*;

/// The downlevel table capability that middleware wraps.
///
/// Implementations own their failure modes: every operation either returns
/// its response or an error, and callers above the middleware see exactly
/// that outcome.
#[async_trait]
pub trait DbCoreTable: Send + Sync {
    /// Name of the table
    fn name(&self) -> &str;

    async fn mutate(&self, req: MutateRequest) -> anyhow::Result<MutateResponse>;

    async fn get(&self, req: GetRequest) -> anyhow::Result<Option<Value>>;

    async fn get_many(&self, req: GetManyRequest) -> anyhow::Result<Vec<Option<Value>>>;

    async fn query(&self, req: QueryRequest) -> anyhow::Result<QueryResponse>;

    async fn open_cursor(&self, req: OpenCursorRequest) -> anyhow::Result<Option<Cursor>>;

    async fn count(&self, req: CountRequest) -> anyhow::Result<u64>;
}

/// A database exposing its tables by name
pub trait DbCore: Send + Sync {
    type Table: DbCoreTable;

    fn table(&self, name: &str) -> anyhow::Result<Self::Table>;

    fn table_names(&self) -> Vec<String>;
}
