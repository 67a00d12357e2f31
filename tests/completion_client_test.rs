//! Wire-level tests for the completion client against a mock endpoint.

mod common;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{COMPLETION_PATH, TEST_API_KEY, chat_reply, client_for, mount_chat_reply};
use gitgenie::config::ApiFormat;
use gitgenie::error::CompletionError;
use gitgenie::llm::{CompletionClient, Prompt};

fn prompt() -> Prompt {
    Prompt {
        system: "You write commit messages.".to_string(),
        user: "diff --git a/x b/x".to_string(),
    }
}

#[tokio::test]
async fn test_chat_request_shape_and_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .and(header("authorization", format!("Bearer {TEST_API_KEY}").as_str()))
        .and(header("x-title", "gitgenie"))
        .and(body_partial_json(json!({
            "model": "test/model",
            "temperature": 0.2,
            "messages": [
                { "role": "system", "content": "You write commit messages." },
                { "role": "user", "content": "diff --git a/x b/x" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("  Add x\n\nx: new  ")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, ApiFormat::Chat);
    let text = client.complete(&prompt()).await.unwrap();
    assert_eq!(text, "Add x\n\nx: new");
}

#[tokio::test]
async fn test_messages_request_shape_and_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETION_PATH))
        .and(header("x-api-key", TEST_API_KEY))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "test/model",
            "max_tokens": 4096,
            "system": "You write commit messages.",
            "messages": [ { "role": "user", "content": "diff --git a/x b/x" } ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [ { "type": "text", "text": "Add x" } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, ApiFormat::Messages);
    assert_eq!(client.complete(&prompt()).await.unwrap(), "Add x");
}

#[tokio::test]
async fn test_non_success_status_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429).set_body_string(r#"{"error":{"message":"rate limited"}}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, ApiFormat::Chat);
    match client.complete(&prompt()).await {
        Err(CompletionError::Upstream { status, body }) => {
            assert_eq!(status, 429);
            assert_eq!(body, r#"{"error":{"message":"rate limited"}}"#);
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_fields_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = client_for(&server, ApiFormat::Chat);
    assert!(matches!(
        client.complete(&prompt()).await,
        Err(CompletionError::Parse(_))
    ));
}

#[tokio::test]
async fn test_non_json_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server, ApiFormat::Chat);
    assert!(matches!(
        client.complete(&prompt()).await,
        Err(CompletionError::Parse(_))
    ));
}

#[tokio::test]
async fn test_structured_reply_tolerates_surrounding_text() {
    let server = MockServer::start().await;
    mount_chat_reply(
        &server,
        "Here you go: {\"subject\": \"Fix {brace} parsing\", \"body\": \"\", \"rating\": 0} hope it helps",
    )
    .await;

    let client = client_for(&server, ApiFormat::Chat);
    let reply = client.complete_structured(&prompt()).await.unwrap();
    assert_eq!(reply.message.subject, "Fix {brace} parsing");
    assert_eq!(reply.message.body, "");
    assert_eq!(reply.rating, 1);
}

#[tokio::test]
async fn test_structured_reply_schema_violation() {
    let server = MockServer::start().await;
    mount_chat_reply(&server, "{\"title\": \"wrong field\", \"rating\": 5}").await;

    let client = client_for(&server, ApiFormat::Chat);
    match client.complete_structured(&prompt()).await {
        Err(CompletionError::Schema { raw, .. }) => {
            assert!(raw.contains("wrong field"));
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}
