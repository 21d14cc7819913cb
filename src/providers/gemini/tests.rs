use super::*;
use crate::providers::base::Message;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn simple_chat_request(content: &str) -> ChatRequest<'_> {
    ChatRequest {
        messages: vec![Message::user(content)],
        model: None,
        max_tokens: 1024,
        temperature: 0.7,
        response_format: ResponseFormat::Text,
    }
}

fn text_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 9, "candidatesTokenCount": 3, "totalTokenCount": 12}
    })
}

fn provider(server: &MockServer) -> GeminiProvider {
    GeminiProvider::with_base_url("test_key".to_string(), None, server.uri())
}

#[tokio::test]
async fn test_chat_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash-lite:generateContent"))
        .and(query_param("key", "test_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_body("Hello, grid.")))
        .mount(&server)
        .await;

    let result = provider(&server).chat(simple_chat_request("Hi")).await.unwrap();
    assert_eq!(result.text(), "Hello, grid.");
    assert_eq!(result.input_tokens, Some(9));
    assert_eq!(result.output_tokens, Some(3));
}

#[tokio::test]
async fn test_system_message_becomes_system_instruction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "system_instruction": {"parts": [{"text": "You are a grid entity."}]},
            "contents": [{"role": "user", "parts": [{"text": "Determine your next move."}]}],
            "generationConfig": {"maxOutputTokens": 2048}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let req = ChatRequest {
        messages: vec![
            Message::system("You are a grid entity."),
            Message::user("Determine your next move."),
        ],
        model: None,
        max_tokens: 2048,
        temperature: 0.9,
        response_format: ResponseFormat::Text,
    };
    provider(&server).chat(req).await.unwrap();
}

#[tokio::test]
async fn test_json_mode_sets_mime_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "generationConfig": {"response_mime_type": "application/json"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_body("{\"name\":\"x\"}")))
        .expect(1)
        .mount(&server)
        .await;

    let mut req = simple_chat_request("persona");
    req.response_format = ResponseFormat::JsonObject;
    let result = provider(&server).chat(req).await.unwrap();
    assert_eq!(result.text(), "{\"name\":\"x\"}");
}

#[tokio::test]
async fn test_chat_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .chat(simple_chat_request("Hi"))
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("Authentication"), "Error: {}", err);
}

#[tokio::test]
async fn test_chat_rate_limit_is_typed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "7")
                .set_body_string("quota"),
        )
        .mount(&server)
        .await;

    let err = provider(&server)
        .chat(simple_chat_request("Hi"))
        .await
        .unwrap_err();
    match err.downcast_ref::<crate::errors::GridError>() {
        Some(crate::errors::GridError::RateLimit { retry_after }) => {
            assert_eq!(*retry_after, Some(7));
        }
        other => panic!("expected rate limit, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chat_metrics_updated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_body("Hi")))
        .mount(&server)
        .await;

    let p = provider(&server);
    p.chat(simple_chat_request("Hi")).await.unwrap();
    let metrics = p.metrics();
    assert_eq!(metrics.request_count, 1);
    assert_eq!(metrics.token_count, 12);
}

#[tokio::test]
async fn test_chat_custom_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_body("Flash response")))
        .mount(&server)
        .await;

    let p = GeminiProvider::with_base_url(
        "test_key".to_string(),
        Some("gemini-2.0-flash".to_string()),
        server.uri(),
    );
    let result = p.chat(simple_chat_request("Hi")).await.unwrap();
    assert_eq!(result.text(), "Flash response");
}

#[test]
fn test_parse_response_without_candidates_fails() {
    assert!(GeminiProvider::parse_response(&json!({"candidates": []})).is_err());
}

#[test]
fn test_parse_response_joins_text_parts() {
    let body = json!({
        "candidates": [{"content": {"parts": [{"text": "THOUGHT: a"}, {"text": "\nACTION: {}"}]}}]
    });
    let parsed = GeminiProvider::parse_response(&body).unwrap();
    assert_eq!(parsed.text(), "THOUGHT: a\nACTION: {}");
}
