//! Decoding of the decision model's answer.

use serde::Deserialize;

use crate::chat::ChatCompletion;
use crate::error::FallbackReason;

/// The decision model's choice. Both keys are required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoutingDecision {
    pub chosen_model: String,
    pub reasoning: String,
}

/// Parse the first choice's content as a [`RoutingDecision`].
///
/// The decision call runs in JSON mode, so the body must be a JSON object
/// as-is; text around it or markdown fences are decode failures.
pub fn parse_decision(completion: &ChatCompletion) -> Result<RoutingDecision, FallbackReason> {
    let content = completion
        .first_content()
        .ok_or_else(|| FallbackReason::Decode("response has no message content".to_string()))?;

    serde_json::from_str(content).map_err(|e| {
        let snippet: String = content.chars().take(200).collect();
        FallbackReason::Decode(format!("{}. Content: {}", e, snippet))
    })
}
