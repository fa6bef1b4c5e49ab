#![allow(dead_code)]

use async_trait::async_trait;
use dbcore_logger::callbacks::LOG_TARGET;
use dbcore_logger::{LoggingCallbacks, RequestContext, ResponseLogger, ResponseTiming};
use dbcore_types::*;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// Error returned by a [`ScriptedTable`] configured to fail
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("backend unavailable: {0}")]
pub struct BackendError(pub String);

/// Delegate table with fixed responses, an optional delay and optional failure
#[derive(Clone)]
pub struct ScriptedTable {
    name: String,
    delay: Duration,
    failing: bool,
    calls: Arc<AtomicUsize>,
}

impl ScriptedTable {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            delay: Duration::ZERO,
            failing: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Number of calls that reached this table
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing {
            return Err(BackendError(self.name.clone()).into());
        }
        Ok(())
    }

    pub fn cursor() -> Cursor {
        Cursor {
            key: json!("user_1"),
            primary_key: json!("user_1"),
            value: Some(json!({"id": "user_1"})),
        }
    }
}

#[async_trait]
impl DbCoreTable for ScriptedTable {
    fn name(&self) -> &str {
        &self.name
    }

    async fn mutate(&self, req: MutateRequest) -> anyhow::Result<MutateResponse> {
        self.enter().await?;
        let written = match &req.mutation {
            Mutation::Add { values, .. } | Mutation::Put { values, .. } => values.len(),
            Mutation::Delete { keys } => keys.len(),
            Mutation::DeleteRange { .. } => 0,
        };
        Ok(MutateResponse {
            num_failures: 0,
            failures: Default::default(),
            last_result: Some(json!(written)),
            results: (0..written).map(|i| json!(i)).collect(),
        })
    }

    async fn get(&self, req: GetRequest) -> anyhow::Result<Option<Value>> {
        self.enter().await?;
        Ok(Some(json!({"id": req.key, "name": req.key})))
    }

    async fn get_many(&self, req: GetManyRequest) -> anyhow::Result<Vec<Option<Value>>> {
        self.enter().await?;
        Ok(req
            .keys
            .into_iter()
            .map(|key| if key.is_null() { None } else { Some(json!({"id": key})) })
            .collect())
    }

    async fn query(&self, req: QueryRequest) -> anyhow::Result<QueryResponse> {
        self.enter().await?;
        let limit = req.limit.unwrap_or(3);
        Ok(QueryResponse {
            result: (0..limit).map(|i| json!({"id": i})).collect(),
        })
    }

    async fn open_cursor(&self, _req: OpenCursorRequest) -> anyhow::Result<Option<Cursor>> {
        self.enter().await?;
        Ok(Some(Self::cursor()))
    }

    async fn count(&self, _req: CountRequest) -> anyhow::Result<u64> {
        self.enter().await?;
        Ok(42)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Request {
        table: String,
        operation: OperationKind,
        request: Value,
    },
    Response {
        table: String,
        operation: OperationKind,
        response: Value,
        elapsed: Duration,
    },
}

impl Event {
    pub fn is_request(&self) -> bool {
        matches!(self, Event::Request { .. })
    }
}

/// Callback set that records both phases verbatim
#[derive(Clone, Default)]
pub struct SpyCallbacks {
    events: Arc<Mutex<Vec<Event>>>,
    /// Operations for which the request phase hands back no response logger
    request_only: Vec<OperationKind>,
}

impl SpyCallbacks {
    pub fn request_only(operations: &[OperationKind]) -> Self {
        Self {
            request_only: operations.to_vec(),
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl LoggingCallbacks for SpyCallbacks {
    fn on_request(&self, request: Request<'_>, ctx: &RequestContext) -> Option<ResponseLogger> {
        let operation = request.kind();
        self.events.lock().unwrap().push(Event::Request {
            table: ctx.table_name.clone(),
            operation,
            request: request.to_json().unwrap(),
        });

        if self.request_only.contains(&operation) {
            return None;
        }

        let events = self.events.clone();
        let table = ctx.table_name.clone();
        Some(Box::new(move |response: Response<'_>, timing: ResponseTiming| {
            events.lock().unwrap().push(Event::Response {
                table,
                operation,
                response: response.to_json().unwrap(),
                elapsed: timing.time_elapsed,
            });
        }))
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// A `dbcore_logger` event as seen by a subscriber
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: HashMap<String, Value>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: HashMap<String, Value>,
}

impl Visit for FieldVisitor {
    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), json!(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), json!(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), json!(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), json!(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.insert(field.name().to_string(), json!(value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.insert(field.name().to_string(), json!(format!("{:?}", value)));
        }
    }
}

/// Layer collecting info-level and more severe events emitted under the
/// logger's target
#[derive(Clone, Default)]
pub struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureLayer {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target() != LOG_TARGET || *metadata.level() > Level::INFO {
            return;
        }
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *metadata.level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

/// Route events on the current thread into a fresh [`CaptureLayer`] until
/// the guard is dropped
pub fn capture_events() -> (CaptureLayer, tracing::subscriber::DefaultGuard) {
    let layer = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let guard = tracing::subscriber::set_default(subscriber);
    (layer, guard)
}
