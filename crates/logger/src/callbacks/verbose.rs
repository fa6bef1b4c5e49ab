use dbcore_types::{Request, Response};
use tracing::info;

use super::{pretty, LoggingCallbacks, RequestContext, ResponseLogger, ResponseTiming, LOG_TARGET};

/// Default callback set: one event per request with the full request
/// payload, one per response with the duration and full response payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerboseCallbacks;

impl LoggingCallbacks for VerboseCallbacks {
    fn on_request(&self, request: Request<'_>, ctx: &RequestContext) -> Option<ResponseLogger> {
        let kind = request.kind();
        let table = ctx.table_name.clone();
        let body = pretty(request.to_json());

        match request {
            Request::Mutate(req) => info!(
                target: LOG_TARGET,
                table = %table,
                operation = kind.label(),
                mutation = req.mutation.type_name(),
                "{} {}: {}\n{}",
                table, kind.label(), req.mutation.type_name(), body
            ),
            Request::Get(req) => info!(
                target: LOG_TARGET,
                table = %table,
                operation = kind.label(),
                key = %req.key,
                "{} {}: key {}\n{}",
                table, kind.label(), req.key, body
            ),
            Request::GetMany(req) => info!(
                target: LOG_TARGET,
                table = %table,
                operation = kind.label(),
                keys = req.keys.len(),
                "{} {}: {} keys\n{}",
                table, kind.label(), req.keys.len(), body
            ),
            Request::Query(req) => info!(
                target: LOG_TARGET,
                table = %table,
                operation = kind.label(),
                index = req.query.index_label(),
                range = %req.query.range,
                "{} {}: index {}\n{}",
                table, kind.label(), req.query.index_label(), body
            ),
            Request::OpenCursor(req) => info!(
                target: LOG_TARGET,
                table = %table,
                operation = kind.label(),
                index = req.query.index_label(),
                reverse = req.reverse,
                "{} {}: index {}\n{}",
                table, kind.label(), req.query.index_label(), body
            ),
            Request::Count(req) => info!(
                target: LOG_TARGET,
                table = %table,
                operation = kind.label(),
                index = req.query.index_label(),
                range = %req.query.range,
                "{} {}: index {}\n{}",
                table, kind.label(), req.query.index_label(), body
            ),
        }

        Some(Box::new(move |response: Response<'_>, timing: ResponseTiming| {
            info!(
                target: LOG_TARGET,
                table = %table,
                operation = kind.label(),
                duration_ms = timing.millis(),
                "{} {} took {:.2}ms\n{}",
                table,
                kind.label(),
                timing.millis(),
                pretty(response.to_json())
            );
        }))
    }
}
