//! Audit sinks.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{info, warn};

use super::records::{ErrorLog, RequestLog};
use crate::credentials::pool::redact_key;
use crate::error::AuditError;

/// Write-only store for call outcomes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record_request(&self, log: &RequestLog) -> Result<(), AuditError>;
    async fn record_error(&self, log: &ErrorLog) -> Result<(), AuditError>;
}

/// Emits audit records as structured `tracing` events under `routewise::audit`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record_request(&self, log: &RequestLog) -> Result<(), AuditError> {
        info!(
            target: "routewise::audit",
            model = %log.model,
            key = %redact_key(&log.credential),
            success = log.success,
            status_code = log.status_code,
            latency_ms = log.latency_ms,
            requested_at = %log.requested_at.to_rfc3339(),
            "request"
        );
        Ok(())
    }

    async fn record_error(&self, log: &ErrorLog) -> Result<(), AuditError> {
        let request = serde_json::to_string(&log.request)
            .map_err(|e| AuditError::WriteFailed(e.to_string()))?;
        warn!(
            target: "routewise::audit",
            model = %log.model,
            key = %redact_key(&log.credential),
            error_type = %log.error_type,
            status_code = log.status_code,
            request = %request,
            requested_at = %log.requested_at.to_rfc3339(),
            "error: {}",
            log.error_message
        );
        Ok(())
    }
}

/// Keeps records in memory. Embedding callers drain it with
/// [`take_request_logs`](Self::take_request_logs) and
/// [`take_error_logs`](Self::take_error_logs) when they flush.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    requests: Mutex<Vec<RequestLog>>,
    errors: Mutex<Vec<ErrorLog>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_logs(&self) -> Vec<RequestLog> {
        self.requests.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn error_logs(&self) -> Vec<ErrorLog> {
        self.errors.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Remove and return the buffered request records.
    pub fn take_request_logs(&self) -> Vec<RequestLog> {
        self.requests
            .lock()
            .map(|mut v| std::mem::take(&mut *v))
            .unwrap_or_default()
    }

    /// Remove and return the buffered error records.
    pub fn take_error_logs(&self) -> Vec<ErrorLog> {
        self.errors
            .lock()
            .map(|mut v| std::mem::take(&mut *v))
            .unwrap_or_default()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record_request(&self, log: &RequestLog) -> Result<(), AuditError> {
        self.requests
            .lock()
            .map_err(|e| AuditError::WriteFailed(e.to_string()))?
            .push(log.clone());
        Ok(())
    }

    async fn record_error(&self, log: &ErrorLog) -> Result<(), AuditError> {
        self.errors
            .lock()
            .map_err(|e| AuditError::WriteFailed(e.to_string()))?
            .push(log.clone());
        Ok(())
    }
}
