//! Integration tests for chat-relay-service.
//!
//! These tests spawn the real application on a random port and stand in for
//! the upstream completion API with a wiremock server.

use chat_relay_service::config::{CommonConfig, OpenAiConfig, RelayConfig};
use chat_relay_service::startup::Application;
use reqwest::{Client, Method};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHAT_QUERY: &str =
    "query Chat($model: String!, $messages: [MessageInput!]!) { chat(model: $model, messages: $messages) }";

/// Spawn the application on a random port, relaying to the given upstream
/// base URL, and return the port number.
async fn spawn_app(api_base: String) -> u16 {
    let config = RelayConfig {
        common: CommonConfig { port: 0 },
        openai: OpenAiConfig {
            api_key: "test-api-key".to_string(),
            api_base,
        },
    };

    let app = Application::build(config)
        .await
        .expect("Failed to build application");
    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    port
}

fn chat_envelope() -> serde_json::Value {
    json!({
        "query": CHAT_QUERY,
        "variables": {
            "model": "gpt-4o-mini",
            "messages": [{ "role": "user", "content": "hi" }],
        },
    })
}

async fn post_chat(port: u16) -> serde_json::Value {
    let response = Client::new()
        .post(format!("http://localhost:{}/", port))
        .json(&chat_envelope())
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .expect("missing CORS header"),
        "*"
    );

    response.json().await.expect("Failed to parse JSON")
}

#[tokio::test]
async fn options_preflight_returns_204_with_cors_headers() {
    let port = spawn_app("http://localhost:9".to_string()).await;

    let response = Client::new()
        .request(Method::OPTIONS, format!("http://localhost:{}/", port))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 204);

    let headers = response.headers();
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(
        headers.get("access-control-allow-methods").unwrap(),
        "POST, OPTIONS"
    );
    assert_eq!(
        headers.get("access-control-allow-headers").unwrap(),
        "Content-Type"
    );

    let body = response.text().await.expect("Failed to read body");
    assert!(body.is_empty());
}

#[tokio::test]
async fn other_methods_get_readiness_text() {
    let port = spawn_app("http://localhost:9".to_string()).await;
    let client = Client::new();

    // Both a non-matching method on the GraphQL route and an unknown path
    // fall through to the plain readiness text, without CORS headers.
    for request in [
        client.get(format!("http://localhost:{}/", port)),
        client.request(Method::DELETE, format!("http://localhost:{}/", port)),
        client.get(format!("http://localhost:{}/nosuchpath", port)),
    ] {
        let response = request.send().await.expect("Failed to send request");

        assert_eq!(response.status().as_u16(), 200);
        assert!(response.headers().get("access-control-allow-origin").is_none());
        assert_eq!(
            response.text().await.expect("Failed to read body"),
            "GraphQL endpoint ready"
        );
    }
}

#[tokio::test]
async fn malformed_body_returns_500_with_generic_error() {
    let port = spawn_app("http://localhost:9".to_string()).await;

    let response = Client::new()
        .post(format!("http://localhost:{}/", port))
        .header("content-type", "application/json")
        .body("not json at all")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .expect("missing CORS header"),
        "*"
    );

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!({ "error": "GraphQL 执行失败" }));
}

#[tokio::test]
async fn chat_relays_conversation_and_returns_reply() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(body_json(json!({
            "model": "gpt-4o-mini",
            "messages": [{ "role": "user", "content": "hi" }],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "hello" } }],
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let port = spawn_app(upstream.uri()).await;
    let body = post_chat(port).await;

    assert_eq!(body["data"]["chat"], "hello");
}

#[tokio::test]
async fn upstream_rejection_is_reported_in_band() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid key"}"#))
        .mount(&upstream)
        .await;

    let port = spawn_app(upstream.uri()).await;
    let body = post_chat(port).await;

    assert_eq!(
        body["data"]["chat"],
        "❌ OpenAI API 请求失败: 401 - {\"error\":\"invalid key\"}"
    );
}

#[tokio::test]
async fn empty_choices_returns_no_result_fallback() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&upstream)
        .await;

    let port = spawn_app(upstream.uri()).await;
    let body = post_chat(port).await;

    assert_eq!(body["data"]["chat"], "⚠️ OpenAI 无返回结果");
}

#[tokio::test]
async fn empty_reply_text_returns_no_result_fallback() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "" } }],
        })))
        .mount(&upstream)
        .await;

    let port = spawn_app(upstream.uri()).await;
    let body = post_chat(port).await;

    assert_eq!(body["data"]["chat"], "⚠️ OpenAI 无返回结果");
}

#[tokio::test]
async fn malformed_upstream_json_returns_exception_fallback() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&upstream)
        .await;

    let port = spawn_app(upstream.uri()).await;
    let body = post_chat(port).await;

    assert_eq!(body["data"]["chat"], "❗ OpenAI 请求异常，请检查网络或 API Key");
}

#[tokio::test]
async fn unreachable_upstream_returns_exception_fallback() {
    // Nothing listens on this port; the connect fails immediately.
    let port = spawn_app("http://127.0.0.1:9".to_string()).await;
    let body = post_chat(port).await;

    assert_eq!(body["data"]["chat"], "❗ OpenAI 请求异常，请检查网络或 API Key");
}

#[tokio::test]
async fn invalid_document_returns_200_with_graphql_errors() {
    let port = spawn_app("http://localhost:9".to_string()).await;

    let response = Client::new()
        .post(format!("http://localhost:{}/", port))
        .json(&json!({ "query": "{ nosuchfield }" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert!(body["errors"].is_array());
}
