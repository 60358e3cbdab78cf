//! OpenAI-compatible HTTP invoker.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::UpstreamInvoker;
use crate::chat::{ChatCompletion, ChatRequest};
use crate::error::UpstreamError;

/// Default timeout for a single upstream request.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable to override the default timeout.
const TIMEOUT_ENV_VAR: &str = "ROUTEWISE_HTTP_TIMEOUT";

/// Longest error body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Get the configured timeout duration.
///
/// Reads from ROUTEWISE_HTTP_TIMEOUT if set, otherwise uses 60 seconds.
/// An invalid value is logged and ignored.
fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// Calls `{base_url}/chat/completions` with a bearer credential.
#[derive(Clone)]
pub struct HttpInvoker {
    client: Client,
    base_url: String,
}

impl HttpInvoker {
    pub fn new(base_url: impl Into<String>) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(get_timeout())
            .build()
            .map_err(|e| UpstreamError::ClientBuild(e.to_string()))?;

        Ok(Self::with_client(client, base_url))
    }

    /// Use a pre-configured client (custom proxies, test servers).
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl UpstreamInvoker for HttpInvoker {
    async fn invoke(
        &self,
        model: &str,
        request: &ChatRequest,
        credential: &str,
    ) -> Result<ChatCompletion, UpstreamError> {
        let mut payload = request.clone();
        payload.model = model.to_string();

        debug!("POST {} (model {})", self.endpoint(), model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(credential)
            .json(&payload)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                code: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| UpstreamError::Envelope(e.to_string()))
    }
}
