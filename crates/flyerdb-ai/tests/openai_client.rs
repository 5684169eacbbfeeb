//! Integration tests for `OpenAiClient` using wiremock HTTP mocks.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use flyerdb_ai::{AiError, OpenAiClient};

fn test_client(base_url: &str) -> OpenAiClient {
    OpenAiClient::with_base_url("test-key", 30, base_url)
        .expect("client construction should not fail")
}

fn chat_request() -> serde_json::Value {
    json!({
        "model": "gpt-4o",
        "messages": [{ "role": "user", "content": "hello" }]
    })
}

fn completion_with_content(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    })
}

#[tokio::test]
async fn chat_returns_trimmed_first_choice_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_with_content("\n  [1, 2, 3]  \n")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let content = client
        .chat(&chat_request())
        .await
        .expect("chat should succeed");

    assert_eq!(content, "[1, 2, 3]");
}

#[tokio::test]
async fn chat_reads_only_the_first_choice() {
    let server = MockServer::start().await;

    let body = json!({
        "choices": [
            { "message": { "content": "first" } },
            { "message": { "content": "second" } }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let content = client
        .chat(&chat_request())
        .await
        .expect("chat should succeed");

    assert_eq!(content, "first");
}

#[tokio::test]
async fn chat_surfaces_error_status_with_body_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"error": {"message": "Incorrect API key provided"}}"#),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.chat(&chat_request()).await;

    match result {
        Err(AiError::UnexpectedStatus { status, message }) => {
            assert_eq!(status, 401);
            assert!(
                message.contains("Incorrect API key"),
                "error should carry the response body, got: {message}"
            );
        }
        other => panic!("expected UnexpectedStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn chat_reports_missing_choices_as_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.chat(&chat_request()).await;

    assert!(
        matches!(result, Err(AiError::EmptyResponse)),
        "expected EmptyResponse, got: {result:?}"
    );
}

#[tokio::test]
async fn chat_reports_null_content_as_empty_response() {
    let server = MockServer::start().await;

    let body = json!({ "choices": [{ "message": { "content": null } }] });

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.chat(&chat_request()).await;

    assert!(
        matches!(result, Err(AiError::EmptyResponse)),
        "expected EmptyResponse, got: {result:?}"
    );
}

#[tokio::test]
async fn chat_rejects_non_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("upstream proxy error"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.chat(&chat_request()).await;

    assert!(
        matches!(result, Err(AiError::Deserialize { .. })),
        "expected Deserialize error, got: {result:?}"
    );
}

#[tokio::test]
async fn chat_normalizes_trailing_slash_in_base_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_with_content("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let base = format!("{}/", server.uri());
    let client = test_client(&base);
    let content = client
        .chat(&chat_request())
        .await
        .expect("chat should succeed");

    assert_eq!(content, "ok");
}
