//! Instrumented table facade

use async_trait::async_trait;
use dbcore_types::*;
use serde_json::Value;
use std::time::Instant;

use crate::callbacks::{RequestContext, ResponseLogger, ResponseTiming};
use crate::logger::TableLogger;
use crate::transaction::{operation_key, TransactionTracker};

/// Per-call state between the request and the response phase
struct Session {
    started: Instant,
    response_logger: Option<ResponseLogger>,
    tracked: Option<(TransactionId, String)>,
}

impl Session {
    /// Runs on success only; a failed call drops the session unlogged.
    fn finish(self, response: Response<'_>, tracker: Option<&TransactionTracker>) {
        let timing = ResponseTiming {
            time_elapsed: self.started.elapsed(),
        };
        if let Some(response_logger) = self.response_logger {
            response_logger(response, timing);
        }
        if let (Some(tracker), Some((transaction, key))) = (tracker, self.tracked) {
            tracker.record(&transaction, key);
        }
    }
}

/// A table whose operations are logged according to a [`TableLogger`].
///
/// Requests and responses pass through untouched; errors from the wrapped
/// table are returned as-is.
pub struct LoggedTable<T> {
    inner: T,
    table_name: String,
    logger: TableLogger,
}

impl<T: DbCoreTable> LoggedTable<T> {
    pub(crate) fn new(inner: T, logger: TableLogger) -> Self {
        let table_name = inner.name().to_string();
        Self {
            inner,
            table_name,
            logger,
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn logger(&self) -> &TableLogger {
        &self.logger
    }

    fn begin(&self, request: Request<'_>) -> Session {
        let started = Instant::now();

        if !self.logger.should_log(&self.table_name, request.kind()) {
            return Session {
                started,
                response_logger: None,
                tracked: None,
            };
        }

        let ctx = RequestContext {
            table_name: self.table_name.clone(),
        };
        let response_logger = self.logger.callbacks().on_request(request, &ctx);
        let tracked = self
            .logger
            .tracker()
            .and(request.transaction())
            .map(|transaction| (transaction.clone(), operation_key(&self.table_name, &request)));

        Session {
            started,
            response_logger,
            tracked,
        }
    }
}

#[async_trait]
impl<T: DbCoreTable> DbCoreTable for LoggedTable<T> {
    fn name(&self) -> &str {
        &self.table_name
    }

    async fn mutate(&self, req: MutateRequest) -> anyhow::Result<MutateResponse> {
        let session = self.begin(Request::Mutate(&req));
        let res = self.inner.mutate(req).await?;
        session.finish(Response::Mutate(&res), self.logger.tracker());
        Ok(res)
    }

    async fn get(&self, req: GetRequest) -> anyhow::Result<Option<Value>> {
        let session = self.begin(Request::Get(&req));
        let res = self.inner.get(req).await?;
        session.finish(Response::Get(&res), self.logger.tracker());
        Ok(res)
    }

    async fn get_many(&self, req: GetManyRequest) -> anyhow::Result<Vec<Option<Value>>> {
        let session = self.begin(Request::GetMany(&req));
        let res = self.inner.get_many(req).await?;
        session.finish(Response::GetMany(&res), self.logger.tracker());
        Ok(res)
    }

    async fn query(&self, req: QueryRequest) -> anyhow::Result<QueryResponse> {
        let session = self.begin(Request::Query(&req));
        let res = self.inner.query(req).await?;
        session.finish(Response::Query(&res), self.logger.tracker());
        Ok(res)
    }

    async fn open_cursor(&self, req: OpenCursorRequest) -> anyhow::Result<Option<Cursor>> {
        let session = self.begin(Request::OpenCursor(&req));
        let res = self.inner.open_cursor(req).await?;
        session.finish(Response::OpenCursor(&res), self.logger.tracker());
        Ok(res)
    }

    async fn count(&self, req: CountRequest) -> anyhow::Result<u64> {
        let session = self.begin(Request::Count(&req));
        let res = self.inner.count(req).await?;
        session.finish(Response::Count(res), self.logger.tracker());
        Ok(res)
    }
}
