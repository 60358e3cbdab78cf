//! Audited wrapper for direct model calls.
//!
//! Observes a call, writes its audit records, and hands the call's own
//! result back untouched. Failures are never swallowed.

use std::fmt::Display;
use std::future::Future;
use std::sync::LazyLock;
use std::time::Instant;

use chrono::Utc;
use regex_lite::Regex;
use tracing::{error, warn};

use super::records::{ErrorLog, RequestLog, TruncatedRequest};
use super::sink::AuditSink;
use crate::error::UpstreamError;

/// Status recorded for a successful call.
pub const SUCCESS_STATUS: u16 = 200;

/// Status recorded when a failure carries no recognisable code.
pub const UNKNOWN_FAILURE_STATUS: u16 = 500;

static STATUS_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"status code (\d+)").expect("status code regex is valid"));

/// How a failed call reports its HTTP status.
pub trait ClassifyFailure: Display {
    /// Status carried in structured form, if any. When `None`, the status is
    /// parsed out of the error text.
    fn structured_status(&self) -> Option<u16>;
}

impl ClassifyFailure for UpstreamError {
    fn structured_status(&self) -> Option<u16> {
        self.status_code()
    }
}

/// Identity of the instrumented call.
#[derive(Debug, Clone)]
pub struct CallInfo {
    pub model: String,
    pub credential: String,
    /// Tag stored on error records, e.g. `openai-embedding`.
    pub error_type: String,
    pub request: TruncatedRequest,
}

/// Pull `status code NNN` out of an error message, defaulting to 500.
pub fn status_from_message(message: &str) -> u16 {
    STATUS_CODE_RE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(UNKNOWN_FAILURE_STATUS)
}

/// Run `call`, then record one request log, plus one error log on failure.
///
/// The call's result is returned unchanged. Sink failures are logged and
/// otherwise ignored.
pub async fn instrumented<T, E, F>(sink: &dyn AuditSink, info: CallInfo, call: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: ClassifyFailure,
{
    let started = Instant::now();
    let requested_at = Utc::now();

    let result = call.await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let status_code = match &result {
        Ok(_) => SUCCESS_STATUS,
        Err(e) => {
            let (status_code, error_message) = match e.structured_status() {
                Some(code) => (code, format!("API error: {}", e)),
                None => {
                    let message = e.to_string();
                    (status_from_message(&message), format!("Generic error: {}", message))
                }
            };
            error!("Error calling {} ({}): {}", info.model, info.error_type, error_message);

            let log = ErrorLog {
                credential: info.credential.clone(),
                model: info.model.clone(),
                error_type: info.error_type.clone(),
                error_message,
                status_code,
                request: info.request.clone(),
                requested_at,
            };
            if let Err(sink_err) = sink.record_error(&log).await {
                warn!("Failed to record error log: {}", sink_err);
            }

            status_code
        }
    };

    let log = RequestLog {
        model: info.model,
        credential: info.credential,
        success: result.is_ok(),
        status_code,
        latency_ms,
        requested_at,
    };
    if let Err(sink_err) = sink.record_request(&log).await {
        warn!("Failed to record request log: {}", sink_err);
    }

    result
}
