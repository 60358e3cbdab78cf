//! Invoker decorator that audits every call it forwards.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use super::UpstreamInvoker;
use crate::audit::{AuditSink, CallInfo, RequestInput, TruncatedRequest, instrumented};
use crate::chat::{ChatCompletion, ChatRequest};
use crate::error::UpstreamError;

/// Error tag stored on audit records for chat completion calls.
pub const CHAT_ERROR_TYPE: &str = "openai-chat";

pub struct AuditedInvoker {
    inner: Arc<dyn UpstreamInvoker>,
    sink: Arc<dyn AuditSink>,
}

impl AuditedInvoker {
    pub fn new(inner: Arc<dyn UpstreamInvoker>, sink: Arc<dyn AuditSink>) -> Self {
        Self { inner, sink }
    }
}

#[async_trait]
impl UpstreamInvoker for AuditedInvoker {
    async fn invoke(
        &self,
        model: &str,
        request: &ChatRequest,
        credential: &str,
    ) -> Result<ChatCompletion, UpstreamError> {
        let body = audit_body(&request.messages);
        let info = CallInfo {
            model: model.to_string(),
            credential: credential.to_string(),
            error_type: CHAT_ERROR_TYPE.to_string(),
            request: TruncatedRequest::from_input(RequestInput::Text(&body)),
        };

        instrumented(
            self.sink.as_ref(),
            info,
            self.inner.invoke(model, request, credential),
        )
        .await
    }
}

/// JSON text of a request for the audit record, or a marker naming the
/// serialization error.
fn audit_body<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}
