//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Value, json};

use routewise::{ChatRequest, HttpInvoker, KeyPool, RouterConfig, RoutingEngine};

/// Get the path to test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Read a fixture file as a string.
pub fn read_fixture(path: PathBuf) -> String {
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

/// Load a chat request fixture.
pub fn request_fixture(name: &str) -> ChatRequest {
    let raw = read_fixture(fixtures_dir().join("requests").join(name));
    serde_json::from_str(&raw).unwrap_or_else(|e| panic!("Invalid request fixture {}: {}", name, e))
}

/// The fixture router config, pointed at `base_url`.
pub fn router_config(base_url: &str) -> RouterConfig {
    let raw = read_fixture(fixtures_dir().join("configs").join("router.toml"));
    let mut config = RouterConfig::from_toml_str(&raw).expect("Invalid config fixture");
    config.base_url = base_url.to_string();
    config.validate().expect("Config fixture should validate");
    config
}

/// An engine wired to the real key pool and HTTP invoker.
pub fn engine(config: RouterConfig) -> RoutingEngine {
    let pool = Arc::new(KeyPool::new(config.api_keys.clone(), config.max_key_failures));
    let invoker = Arc::new(HttpInvoker::new(config.base_url.clone()).expect("HTTP client"));
    RoutingEngine::new(Arc::new(config), pool, invoker).expect("Config should validate")
}

/// Chat completion envelope whose message content is `content`.
pub fn completion_with_content(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

/// Chat completion envelope carrying a routing decision.
pub fn decision_response(chosen_model: &str, reasoning: &str) -> Value {
    let decision = json!({"chosen_model": chosen_model, "reasoning": reasoning});
    completion_with_content(&decision.to_string())
}
