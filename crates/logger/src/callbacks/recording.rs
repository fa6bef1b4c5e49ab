use dbcore_types::{Request, Response};
use tracing::debug;

use super::{pretty, LoggingCallbacks, RequestContext, ResponseLogger, ResponseTiming, LOG_TARGET};
use crate::debug::{OperationEntry, OperationLog};

/// Captures every completed call into an [`OperationLog`] instead of
/// emitting formatted output.
#[derive(Clone, Default)]
pub struct RecordingCallbacks {
    log: OperationLog,
}

impl RecordingCallbacks {
    pub fn new(log: OperationLog) -> Self {
        Self { log }
    }

    pub fn with_capacity(max_size: usize) -> Self {
        Self::new(OperationLog::new(max_size))
    }

    /// The shared log entries are written to
    pub fn log(&self) -> &OperationLog {
        &self.log
    }
}

impl LoggingCallbacks for RecordingCallbacks {
    fn on_request(&self, request: Request<'_>, ctx: &RequestContext) -> Option<ResponseLogger> {
        let entry = OperationEntry::new(
            ctx.table_name.clone(),
            request.kind(),
            request.summary(),
            request
                .to_json()
                .unwrap_or_else(|e| serde_json::Value::String(pretty(Err(e)))),
        );
        let log = self.log.clone();

        Some(Box::new(move |response: Response<'_>, timing: ResponseTiming| {
            let response = response
                .to_json()
                .unwrap_or_else(|e| serde_json::Value::String(pretty(Err(e))));
            let entry = entry.completed(response, timing.millis());
            debug!(
                target: LOG_TARGET,
                table = %entry.table(),
                operation = %entry.operation(),
                "recorded operation"
            );
            log.push(entry);
        }))
    }
}
