//! Upstream model invocation.

pub mod audited;
pub mod http;

use async_trait::async_trait;

use crate::chat::{ChatCompletion, ChatRequest};
use crate::error::UpstreamError;

pub use audited::AuditedInvoker;
pub use http::HttpInvoker;

/// Executes one chat completion call against a model-serving backend.
///
/// This abstraction allows mocking the backend in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpstreamInvoker: Send + Sync {
    async fn invoke(
        &self,
        model: &str,
        request: &ChatRequest,
        credential: &str,
    ) -> Result<ChatCompletion, UpstreamError>;
}
