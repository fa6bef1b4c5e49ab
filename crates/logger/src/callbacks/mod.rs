//! Two-phase logging callbacks.
//!
//! A callback set is consulted before each logged call with the request and
//! may hand back a [`ResponseLogger`], which is invoked once the call
//! succeeds with the response and the elapsed time.

use dbcore_types::{Request, Response};
use std::time::Duration;

mod minimal;
mod recording;
mod verbose;

pub use minimal::MinimalCallbacks;
pub use recording::RecordingCallbacks;
pub use verbose::VerboseCallbacks;

/// Target for all events emitted by the built-in callback sets
pub const LOG_TARGET: &str = "dbcore_logger";

/// Context handed to the request phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub table_name: String,
}

/// Context handed to the response phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseTiming {
    pub time_elapsed: Duration,
}

impl ResponseTiming {
    /// Elapsed time in fractional milliseconds
    pub fn millis(&self) -> f64 {
        self.time_elapsed.as_secs_f64() * 1000.0
    }
}

/// Response phase, produced by the request phase of the same call
pub type ResponseLogger = Box<dyn FnOnce(Response<'_>, ResponseTiming) + Send>;

/// A set of per-operation logging callbacks.
///
/// Implementations dispatch on the [`Request`] variant; returning `None`
/// means the operation has no response phase.
pub trait LoggingCallbacks: Send + Sync {
    fn on_request(&self, request: Request<'_>, ctx: &RequestContext) -> Option<ResponseLogger>;
}

/// Render a payload as indented JSON for log output
pub(crate) fn pretty(value: serde_json::Result<serde_json::Value>) -> String {
    value
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|e| {
            tracing::error!(target: LOG_TARGET, "Failed to serialize payload: {}", e);
            format!("<unserializable: {}>", e)
        })
}
