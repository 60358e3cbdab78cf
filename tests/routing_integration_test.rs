//! End-to-end routing against a mocked OpenAI-compatible server.

mod common;

use routewise::FallbackReason;
use routewise::router::IMAGE_ONLY_PLACEHOLDER;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_routes_to_chosen_worker() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-first-key-0001"))
        .and(body_partial_json(serde_json::json!({
            "model": "router-small",
            "response_format": {"type": "json_object"}
        })))
        .and(body_string_contains("parses ISO-8601 dates"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::decision_response("coder", "The user wants code")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = common::engine(common::router_config(&server.uri()));
    let request = common::request_fixture("plain_text.json");

    assert_eq!(engine.select_worker_model(&request).await, "coder");
}

#[tokio::test]
async fn test_multimodal_request_uses_text_part() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("What breed is this cat?"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::decision_response("vision", "Image")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = common::engine(common::router_config(&server.uri()));
    let request = common::request_fixture("multimodal.json");

    assert_eq!(engine.select_worker_model(&request).await, "vision");
}

#[tokio::test]
async fn test_image_only_request_uses_placeholder() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains(IMAGE_ONLY_PLACEHOLDER))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::decision_response("vision", "Image")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = common::engine(common::router_config(&server.uri()));
    let request = common::request_fixture("image_only.json");

    assert_eq!(engine.select_worker_model(&request).await, "vision");
}

#[tokio::test]
async fn test_no_user_message_never_calls_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let engine = common::engine(common::router_config(&server.uri()));
    let outcome = engine.route(&common::request_fixture("no_user.json")).await;

    assert_eq!(outcome.model(), "general");
    assert!(matches!(outcome.fallback_reason(), Some(FallbackReason::NoIntent)));
}

#[tokio::test]
async fn test_unknown_worker_falls_back_to_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::decision_response("gpt-5-ultra", "Only the best")),
        )
        .mount(&server)
        .await;

    let engine = common::engine(common::router_config(&server.uri()));
    let outcome = engine.route(&common::request_fixture("plain_text.json")).await;

    assert_eq!(outcome.model(), "general");
    assert!(matches!(
        outcome.fallback_reason(),
        Some(FallbackReason::InvalidChoice(choice)) if choice == "gpt-5-ultra"
    ));
}

#[tokio::test]
async fn test_non_json_decision_falls_back_to_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::completion_with_content("I think coder is best.")),
        )
        .mount(&server)
        .await;

    let engine = common::engine(common::router_config(&server.uri()));
    let outcome = engine.route(&common::request_fixture("plain_text.json")).await;

    assert_eq!(outcome.model(), "general");
    assert!(matches!(outcome.fallback_reason(), Some(FallbackReason::Decode(_))));
}

#[tokio::test]
async fn test_failing_key_is_rotated_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-first-key-0001"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-second-key-0002"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::decision_response("coder", "Code")),
        )
        .expect(2)
        .mount(&server)
        .await;

    let engine = common::engine(common::router_config(&server.uri()));
    let request = common::request_fixture("plain_text.json");

    // First key is rejected: this call falls back, and the key is retired.
    let first = engine.route(&request).await;
    assert_eq!(first.model(), "general");
    assert!(matches!(first.fallback_reason(), Some(FallbackReason::Upstream(_))));

    // Round-robin lands on the second key, then skips the retired first key.
    assert_eq!(engine.select_worker_model(&request).await, "coder");
    assert_eq!(engine.select_worker_model(&request).await, "coder");
}

#[tokio::test]
async fn test_retired_keys_are_still_tried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(3)
        .mount(&server)
        .await;

    let engine = common::engine(common::router_config(&server.uri()));
    let request = common::request_fixture("plain_text.json");

    // Each key fails once and is retired (max_key_failures = 1).
    assert_eq!(engine.select_worker_model(&request).await, "general");
    assert_eq!(engine.select_worker_model(&request).await, "general");

    // With every key retired the least-failed one still goes upstream.
    let outcome = engine.route(&request).await;
    assert_eq!(outcome.model(), "general");
    assert!(matches!(outcome.fallback_reason(), Some(FallbackReason::Upstream(_))));
}

#[tokio::test]
async fn test_single_key_recovers_after_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .up_to_n_times(3)
        .with_priority(1)
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-first-key-0001"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::decision_response("coder", "Code")),
        )
        .expect(2)
        .mount(&server)
        .await;

    let mut config = common::router_config(&server.uri());
    config.api_keys = vec!["sk-first-key-0001".to_string()];
    config.max_key_failures = 3;
    let engine = common::engine(config);
    let request = common::request_fixture("plain_text.json");

    for _ in 0..3 {
        let outcome = engine.route(&request).await;
        assert_eq!(outcome.model(), "general");
        assert!(matches!(outcome.fallback_reason(), Some(FallbackReason::Upstream(_))));
    }

    // Server errors are not the key's fault, so it was never retired.
    assert_eq!(engine.select_worker_model(&request).await, "coder");
    assert_eq!(engine.select_worker_model(&request).await, "coder");
}

#[tokio::test]
async fn test_unreachable_upstream_falls_back() {
    let engine = common::engine(common::router_config("http://127.0.0.1:9"));
    let outcome = engine.route(&common::request_fixture("plain_text.json")).await;

    assert_eq!(outcome.model(), "general");
    assert!(matches!(outcome.fallback_reason(), Some(FallbackReason::Upstream(_))));
}
