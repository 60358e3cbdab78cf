//! Audit records for direct model calls.

pub mod instrument;
pub mod records;
pub mod sink;

pub use instrument::{CallInfo, ClassifyFailure, instrumented, status_from_message};
pub use records::{ErrorLog, RequestInput, RequestLog, TruncatedInput, TruncatedRequest};
pub use sink::{AuditSink, MemoryAuditSink, TracingAuditSink};
