//! Inference client tests against a mock generation endpoint.
//!
//! The client is blocking, so every call runs on a blocking thread while the
//! mock server lives on the async runtime.

use llm_docgen::{Generator, InferenceClient, InferenceConfig, InferenceRequest, INFERENCE_FAILURE};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(endpoint: String) -> InferenceConfig {
    let mut config = InferenceConfig::default();
    config.endpoint = endpoint;
    config.model = "test-model".to_string();
    config.timeout = Duration::from_secs(5);
    config.max_retries = 2;
    config.retry_backoff = Duration::from_millis(10);
    config
}

async fn generate(config: InferenceConfig, source: &'static str) -> String {
    tokio::task::spawn_blocking(move || {
        let client = InferenceClient::new(config).unwrap();
        client.generate(source)
    })
    .await
    .unwrap()
}

async fn mount_body(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concatenates_streamed_fragments() {
    let server = MockServer::start().await;
    mount_body(
        &server,
        200,
        "{\"response\":\"Hello\"}\n{\"response\":\", world\"}\n{\"done\":true}\n",
    )
    .await;

    let text = generate(config_for(format!("{}/api/generate", server.uri())), "x = 1").await;

    assert_eq!(text, "Hello, world");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_skips_malformed_line() {
    let server = MockServer::start().await;
    mount_body(&server, 200, "{\"response\": \"bro\n{\"response\":\"ok\"}\n").await;

    let text = generate(config_for(format!("{}/api/generate", server.uri())), "x = 1").await;

    assert_eq!(text, "ok");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_request_body_carries_prompt_and_stream_flag() {
    let server = MockServer::start().await;
    mount_body(&server, 200, "{\"response\":\"done\"}\n").await;

    let config = config_for(format!("{}/api/generate", server.uri()));
    let expected = InferenceRequest::new(&config, "print('hi')");
    generate(config, "print('hi')").await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["stream"], true);
    assert_eq!(body["prompt"], expected.prompt.as_str());
    assert!(body["prompt"].as_str().unwrap().contains("print('hi')"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_is_retried_then_reported() {
    let server = MockServer::start().await;
    mount_body(&server, 500, "boom").await;

    let text = generate(config_for(format!("{}/api/generate", server.uri())), "x = 1").await;

    assert_eq!(text, INFERENCE_FAILURE);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;
    mount_body(&server, 404, "model not found").await;

    let text = generate(config_for(format!("{}/api/generate", server.uri())), "x = 1").await;

    assert_eq!(text, INFERENCE_FAILURE);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_stream_yields_empty_text() {
    let server = MockServer::start().await;
    mount_body(&server, 200, "").await;

    let text = generate(config_for(format!("{}/api/generate", server.uri())), "x = 1").await;

    assert_eq!(text, "");
}

#[test]
fn test_connection_refused_yields_failure_text() {
    let mut config = config_for("http://127.0.0.1:1/api/generate".to_string());
    config.max_retries = 0;

    let client = InferenceClient::new(config).unwrap();

    assert_eq!(client.generate("x = 1"), INFERENCE_FAILURE);
}
