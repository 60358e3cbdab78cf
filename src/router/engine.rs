//! Routing decision engine.
//!
//! Asks a decision model which worker should serve a request, validates the
//! answer against the configured workers, and falls back to the default
//! worker on any failure. A routing call never fails.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::chat::{ChatRequest, ResponseFormat};
use crate::config::RouterConfig;
use crate::credentials::CredentialSupplier;
use crate::error::{ConfigError, FallbackReason};
use crate::upstream::UpstreamInvoker;

use super::decision::{RoutingDecision, parse_decision};
use super::intent::extract_intent;
use super::prompt::build_routing_prompt;

/// Result of one routing call.
#[derive(Debug)]
pub enum RouteOutcome {
    /// The decision model picked a configured worker.
    Chosen { model: String, reasoning: String },
    /// Routing could not be trusted; `model` is the default worker.
    Fallback { model: String, reason: FallbackReason },
}

impl RouteOutcome {
    /// The worker that should serve the request.
    pub fn model(&self) -> &str {
        match self {
            RouteOutcome::Chosen { model, .. } | RouteOutcome::Fallback { model, .. } => model,
        }
    }

    pub fn into_model(self) -> String {
        match self {
            RouteOutcome::Chosen { model, .. } | RouteOutcome::Fallback { model, .. } => model,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, RouteOutcome::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            RouteOutcome::Fallback { reason, .. } => Some(reason),
            RouteOutcome::Chosen { .. } => None,
        }
    }
}

/// Routes requests using an immutable config and shared collaborators.
///
/// Holds no mutable state, so concurrent `route` calls are independent.
pub struct RoutingEngine {
    config: Arc<RouterConfig>,
    credentials: Arc<dyn CredentialSupplier>,
    upstream: Arc<dyn UpstreamInvoker>,
}

impl RoutingEngine {
    /// Build an engine, rejecting a config that fails validation.
    pub fn new(
        config: Arc<RouterConfig>,
        credentials: Arc<dyn CredentialSupplier>,
        upstream: Arc<dyn UpstreamInvoker>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            credentials,
            upstream,
        })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Pick the worker for `request`. Always a configured worker or the default.
    pub async fn select_worker_model(&self, request: &ChatRequest) -> String {
        self.route(request).await.into_model()
    }

    /// Like [`select_worker_model`](Self::select_worker_model), but keeps
    /// the reasoning or the fallback cause.
    pub async fn route(&self, request: &ChatRequest) -> RouteOutcome {
        match self.decide(request).await {
            Ok(decision) => {
                info!(
                    "LLM router chose '{}'. Reason: {}",
                    decision.chosen_model, decision.reasoning
                );
                RouteOutcome::Chosen {
                    model: decision.chosen_model,
                    reasoning: decision.reasoning,
                }
            }
            Err(reason) => {
                log_fallback(&reason, &self.config.default_worker);
                RouteOutcome::Fallback {
                    model: self.config.default_worker.clone(),
                    reason,
                }
            }
        }
    }

    /// The request sent to the decision model for a given intent.
    pub fn decision_request(&self, intent: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.decision_model.clone(),
            messages: build_routing_prompt(&self.config.workers, intent),
            temperature: Some(0.0),
            response_format: Some(ResponseFormat::json_object()),
        }
    }

    async fn decide(&self, request: &ChatRequest) -> Result<RoutingDecision, FallbackReason> {
        let intent = extract_intent(request).ok_or(FallbackReason::NoIntent)?;
        let decision = self.call_decision_model(&intent).await?;

        if !self.config.is_worker(&decision.chosen_model) {
            return Err(FallbackReason::InvalidChoice(decision.chosen_model));
        }

        Ok(decision)
    }

    async fn call_decision_model(&self, intent: &str) -> Result<RoutingDecision, FallbackReason> {
        let credential = self.credentials.next_credential().await?;
        let request = self.decision_request(intent);

        debug!("Calling decision model '{}'", request.model);

        let completion = match self
            .upstream
            .invoke(&request.model, &request, &credential)
            .await
        {
            Ok(completion) => {
                self.credentials.report_success(&credential).await;
                completion
            }
            Err(e) => {
                if let Some(code) = e.status_code() {
                    self.credentials.report_failure(&credential, code).await;
                }
                return Err(e.into());
            }
        };

        parse_decision(&completion)
    }
}

fn log_fallback(reason: &FallbackReason, default_worker: &str) {
    match reason {
        FallbackReason::NoIntent => warn!(
            "Router could not find user prompt, falling back to default worker '{}'",
            default_worker
        ),
        FallbackReason::InvalidChoice(choice) => warn!(
            "Router chose an invalid model '{}'. Falling back to default '{}'",
            choice, default_worker
        ),
        FallbackReason::Credential(_) | FallbackReason::Upstream(_) | FallbackReason::Decode(_) => {
            error!(
                kind = reason.kind(),
                "LLM router failed to make a decision: {}. Falling back to default worker '{}'",
                reason,
                default_worker
            )
        }
    }
}
