//! `OpenAIClient::chat_completion` against a local `wiremock` server.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use openai_client::{ChatRequest, Message, OpenAIClient, OpenAIError};

#[tokio::test]
async fn returns_first_choice_content_and_usage() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"response_format": {"type": "json_object"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"brands\":[]}"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13}
        })))
        .mount(&server)
        .await;

    let client = OpenAIClient::new("sk-test").with_base_url(server.uri());
    let response = client
        .chat_completion(
            ChatRequest::new("gpt-4o-mini")
                .message(Message::user("extract"))
                .json_mode(),
        )
        .await
        .expect("completion should succeed");

    assert_eq!(response.content, "{\"brands\":[]}");
    assert_eq!(response.usage.map(|u| u.total_tokens), Some(13));
}

#[tokio::test]
async fn non_success_status_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let client = OpenAIClient::new("sk-test").with_base_url(server.uri());
    let result = client
        .chat_completion(ChatRequest::new("gpt-4o-mini").message(Message::user("hi")))
        .await;

    match result {
        Err(OpenAIError::Api(message)) => assert!(message.contains("rate limited")),
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn null_content_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        })))
        .mount(&server)
        .await;

    let client = OpenAIClient::new("sk-test").with_base_url(server.uri());
    let result = client
        .chat_completion(ChatRequest::new("gpt-4o-mini").message(Message::user("hi")))
        .await;

    assert!(matches!(result, Err(OpenAIError::Api(_))), "got: {result:?}");
}
