//! In-memory downlevel database, used to drive middleware in demos and tests.
//!
//! Rows are kept sorted by primary key. Only the primary key is indexed;
//! queries naming a secondary index fail.

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::trace;

use crate::payload::*;
use crate::table::{DbCore, DbCoreTable};

type Rows = Vec<(Value, Value)>;

/// A set of named in-memory tables sharing one latency setting
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    tables: BTreeMap<String, MemoryTable>,
}

impl MemoryDatabase {
    /// Create a database with the given tables, each keyed by `id`
    pub fn new<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tables = tables
            .into_iter()
            .map(|name| {
                let table = MemoryTable::new(name);
                (table.name.clone(), table)
            })
            .collect();
        Self { tables }
    }

    /// Apply an artificial delay to every table operation
    pub fn with_latency(self, latency: Duration) -> Self {
        let tables = self
            .tables
            .into_iter()
            .map(|(name, table)| (name, table.with_latency(latency)))
            .collect();
        Self { tables }
    }
}

impl DbCore for MemoryDatabase {
    type Table = MemoryTable;

    fn table(&self, name: &str) -> anyhow::Result<MemoryTable> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("table '{}' does not exist", name))
    }

    fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}

/// A single in-memory table. Clones share the same rows.
#[derive(Clone)]
pub struct MemoryTable {
    name: String,
    primary_key: String,
    rows: Arc<RwLock<Rows>>,
    latency: Option<Duration>,
}

impl MemoryTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: "id".to_string(),
            rows: Arc::new(RwLock::new(Vec::new())),
            latency: None,
        }
    }

    /// Use a different inbound primary key property (default `id`)
    pub fn with_primary_key(mut self, property: impl Into<String>) -> Self {
        self.primary_key = property.into();
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of stored rows
    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn read_rows(&self) -> anyhow::Result<std::sync::RwLockReadGuard<'_, Rows>> {
        self.rows
            .read()
            .map_err(|_| anyhow!("rows of table '{}' are poisoned", self.name))
    }

    fn write_rows(&self) -> anyhow::Result<std::sync::RwLockWriteGuard<'_, Rows>> {
        self.rows
            .write()
            .map_err(|_| anyhow!("rows of table '{}' are poisoned", self.name))
    }

    fn key_of(&self, value: &Value, explicit: Option<&Value>) -> Option<Value> {
        explicit
            .cloned()
            .or_else(|| value.get(&self.primary_key).cloned())
    }

    fn matching<'r>(&self, rows: &'r Rows, query: &DbCoreQuery) -> anyhow::Result<Vec<&'r (Value, Value)>> {
        if !query.is_primary() {
            bail!(
                "index '{}' does not exist on table '{}'",
                query.index,
                self.name
            );
        }
        Ok(rows
            .iter()
            .filter(|(key, _)| query.range.contains(key))
            .collect())
    }

    fn write(&self, values: &[Value], keys: Option<&Vec<Value>>, overwrite: bool) -> anyhow::Result<MutateResponse> {
        let mut rows = self.write_rows()?;
        let mut response = MutateResponse::default();

        for (position, value) in values.iter().enumerate() {
            let explicit = keys.and_then(|keys| keys.get(position));
            let Some(key) = self.key_of(value, explicit) else {
                response
                    .failures
                    .insert(position, format!("missing primary key '{}'", self.primary_key));
                response.results.push(Value::Null);
                continue;
            };

            match rows.binary_search_by(|(existing, _)| compare_keys(existing, &key)) {
                Ok(index) if overwrite => rows[index].1 = value.clone(),
                Ok(_) => {
                    response
                        .failures
                        .insert(position, format!("key {} already exists", key));
                    response.results.push(Value::Null);
                    continue;
                }
                Err(index) => rows.insert(index, (key.clone(), value.clone())),
            }

            response.last_result = Some(key.clone());
            response.results.push(key);
        }

        response.num_failures = response.failures.len();
        Ok(response)
    }
}

#[async_trait]
impl DbCoreTable for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    async fn mutate(&self, req: MutateRequest) -> anyhow::Result<MutateResponse> {
        self.delay().await;
        trace!(table = %self.name, mutation = req.mutation.type_name(), "memory mutate");

        match &req.mutation {
            Mutation::Add { values, keys } => self.write(values, keys.as_ref(), false),
            Mutation::Put { values, keys } => self.write(values, keys.as_ref(), true),
            Mutation::Delete { keys } => {
                let mut rows = self.write_rows()?;
                rows.retain(|(key, _)| !keys.iter().any(|k| compare_keys(k, key).is_eq()));
                Ok(MutateResponse {
                    results: keys.clone(),
                    ..Default::default()
                })
            }
            Mutation::DeleteRange { range } => {
                let mut rows = self.write_rows()?;
                rows.retain(|(key, _)| !range.contains(key));
                Ok(MutateResponse::default())
            }
        }
    }

    async fn get(&self, req: GetRequest) -> anyhow::Result<Option<Value>> {
        self.delay().await;
        let rows = self.read_rows()?;
        Ok(rows
            .binary_search_by(|(key, _)| compare_keys(key, &req.key))
            .ok()
            .map(|index| rows[index].1.clone()))
    }

    async fn get_many(&self, req: GetManyRequest) -> anyhow::Result<Vec<Option<Value>>> {
        self.delay().await;
        let rows = self.read_rows()?;
        Ok(req
            .keys
            .iter()
            .map(|wanted| {
                rows.binary_search_by(|(key, _)| compare_keys(key, wanted))
                    .ok()
                    .map(|index| rows[index].1.clone())
            })
            .collect())
    }

    async fn query(&self, req: QueryRequest) -> anyhow::Result<QueryResponse> {
        self.delay().await;
        let rows = self.read_rows()?;
        let limit = req.limit.unwrap_or(usize::MAX);
        let result = self
            .matching(&rows, &req.query)
            .with_context(|| format!("query on '{}' failed", self.name))?
            .into_iter()
            .take(limit)
            .map(|(key, value)| if req.values { value.clone() } else { key.clone() })
            .collect();
        Ok(QueryResponse { result })
    }

    async fn open_cursor(&self, req: OpenCursorRequest) -> anyhow::Result<Option<Cursor>> {
        self.delay().await;
        let rows = self.read_rows()?;
        let matching = self.matching(&rows, &req.query)?;
        let first = if req.reverse {
            matching.last()
        } else {
            matching.first()
        };
        Ok(first.map(|(key, value)| Cursor {
            key: key.clone(),
            primary_key: key.clone(),
            value: req.values.then(|| value.clone()),
        }))
    }

    async fn count(&self, req: CountRequest) -> anyhow::Result<u64> {
        self.delay().await;
        let rows = self.read_rows()?;
        Ok(self.matching(&rows, &req.query)?.len() as u64)
    }
}
