use dbcore_types::{Request, Response};
use tracing::info;

use super::{LoggingCallbacks, RequestContext, ResponseLogger, ResponseTiming, LOG_TARGET};

/// One line per completed call: table, operation, summary and duration.
/// Nothing is emitted for the request phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalCallbacks;

impl LoggingCallbacks for MinimalCallbacks {
    fn on_request(&self, request: Request<'_>, ctx: &RequestContext) -> Option<ResponseLogger> {
        let kind = request.kind();
        let table = ctx.table_name.clone();
        let summary = request.summary();

        Some(Box::new(move |_: Response<'_>, timing: ResponseTiming| {
            info!(
                target: LOG_TARGET,
                "{} {} {} {:.2}ms",
                table,
                kind.label(),
                summary,
                timing.millis()
            );
        }))
    }
}
