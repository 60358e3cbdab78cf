//! LLM-driven worker selection with default-worker fallback.

pub mod decision;
pub mod engine;
pub mod intent;
pub mod prompt;

pub use decision::{RoutingDecision, parse_decision};
pub use engine::{RouteOutcome, RoutingEngine};
pub use intent::{IMAGE_ONLY_PLACEHOLDER, extract_intent};
pub use prompt::build_routing_prompt;
