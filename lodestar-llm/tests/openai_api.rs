mod common;

use lodestar_llm::openai::OpenAiClient;
use lodestar_llm::traits::{LlmClient, LlmError};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Minimal Responses API payload carrying one `output_text` block.
fn responses_body(text: &str) -> serde_json::Value {
    json!({
        "id": "resp_123",
        "object": "response",
        "created_at": 1_730_000_000,
        "status": "completed",
        "model": "gpt-4o-mini",
        "output": [{
            "id": "msg_1",
            "type": "message",
            "status": "completed",
            "content": [
                { "type": "reasoning", "text": "" },
                { "type": "output_text", "text": text }
            ]
        }]
    })
}

fn mock_client(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new("sk-mock-key".to_string(), "gpt-4o-mini".to_string())
        .expect("client init")
        .with_base_url(&server.uri())
        .expect("mock base url")
}

#[tokio::test]
async fn generate_extracts_output_text() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .and(header("Authorization", "Bearer sk-mock-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(responses_body("hello from mock")))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let resp = client
        .generate("say hello", Some("be terse"), Some(16), Some(0.0))
        .await
        .expect("generate");

    assert_eq!(resp.text, "hello from mock");
    assert_eq!(resp.model.as_deref(), Some("gpt-4o-mini"));
}

#[tokio::test]
async fn client_error_surfaces_api_message() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    // 400 is terminal for the retry policy, so the test stays fast.
    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "model does not exist" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = mock_client(&server)
        .generate("x", None, None, None)
        .await
        .expect_err("must fail");

    match err {
        LlmError::Api(msg) => assert!(msg.contains("model does not exist"), "got: {msg}"),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn rate_limit_maps_to_dedicated_variant() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "slow down" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = mock_client(&server)
        .with_retries(0)
        .generate("x", None, None, None)
        .await
        .expect_err("must fail");

    assert!(matches!(err, LlmError::RateLimit), "got: {err:?}");
}

#[tokio::test]
async fn malformed_body_is_an_api_error() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_string("definitely not json"))
        .expect(1)
        .mount(&server)
        .await;

    let err = mock_client(&server)
        .generate("x", None, None, None)
        .await
        .expect_err("must fail");

    match err {
        LlmError::Api(msg) => assert!(msg.contains("decode"), "got: {msg}"),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_output_text_yields_empty_response() {
    common::init_test_tracing();
    let server = MockServer::start().await;

    let body = json!({
        "id": "resp_empty",
        "model": "gpt-4o-mini",
        "output": []
    });

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let resp = mock_client(&server)
        .generate("x", None, None, None)
        .await
        .expect("generate");

    assert!(resp.text.is_empty());
}
