use super::*;
use crate::config::ServicesConfig;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dispatcher_for(server: &MockServer) -> ToolDispatcher {
    let mut config = Config::default();
    config.services = ServicesConfig::all_at(&server.uri());
    ToolDispatcher::new(&config, Arc::new(SessionBridge::new(true)))
}

fn session(id: &str) -> CallContext {
    CallContext::new(Some(id.to_string()), None)
}

#[test]
fn normalize_pretty_prints_json_and_keeps_text() {
    assert_eq!(
        normalize(Payload::Json(json!({"a": 1}))),
        "{\n  \"a\": 1\n}"
    );
    assert_eq!(normalize(Payload::Text("plain".into())), "plain");
}

#[test]
fn context_binding_key_defaults_to_direct() {
    assert_eq!(CallContext::new(None, Some("t".into())).binding_key(), "direct");
    assert_eq!(CallContext::new(Some(String::new()), None).binding_key(), "direct");
    assert_eq!(session("abc").binding_key(), "abc");
}

#[tokio::test]
async fn ping_needs_nothing() {
    let server = MockServer::start().await;
    let result = dispatcher_for(&server)
        .call_tool("grid_ping", Value::Null, &CallContext::default())
        .await;
    assert_eq!(result, ToolResult::new("pong"));
}

#[tokio::test]
async fn whoami_without_credential_is_anonymous() {
    let server = MockServer::start().await;
    let result = dispatcher_for(&server)
        .call_tool("whoami", json!({}), &session("s1"))
        .await;
    assert_eq!(result.content, "Identity: Anonymous");
    assert!(!result.is_error);
}

#[tokio::test]
async fn unknown_tool_is_a_result_not_a_failure() {
    let server = MockServer::start().await;
    let result = dispatcher_for(&server)
        .call_tool("bank_rob", json!({}), &session("s1"))
        .await;
    assert!(result.is_error);
    assert_eq!(result.content, "Unknown tool: bank_rob");
}

#[tokio::test]
async fn invalid_arguments_skip_the_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = dispatcher_for(&server)
        .call_tool(
            "mail_read_email",
            json!({"email_id": "latest"}),
            &CallContext::new(None, Some("tok".into())),
        )
        .await;
    assert!(result.is_error);
    assert!(
        result
            .content
            .starts_with("ERROR: invalid arguments for mail_read_email"),
        "{}",
        result.content
    );
}

#[tokio::test]
async fn explicit_bearer_is_used_and_bound() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/balance"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"balance": 7})))
        .expect(2)
        .mount(&server)
        .await;
    let dispatcher = dispatcher_for(&server);

    let first = dispatcher
        .call_tool(
            "bank_get_balance",
            json!({}),
            &CallContext::new(Some("s1".into()), Some("tok-1".into())),
        )
        .await;
    assert_eq!(first.content, "{\n  \"balance\": 7\n}");

    // Same session, no header: the bridge supplies the credential.
    let second = dispatcher
        .call_tool("bank_get_balance", json!({}), &session("s1"))
        .await;
    assert!(!second.is_error, "{}", second.content);
}

#[tokio::test]
async fn backend_failure_is_an_error_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pay"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Insufficient funds"})),
        )
        .mount(&server)
        .await;

    let result = dispatcher_for(&server)
        .call_tool(
            "bank_transfer",
            json!({"recipient": "trinity", "amount": 5}),
            &CallContext::new(None, Some("tok".into())),
        )
        .await;
    assert_eq!(
        result,
        ToolResult::error("ERROR: bank returned 400: Insufficient funds")
    );
}

#[tokio::test]
async fn register_prefixes_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register"))
        .and(query_param("username", "neo"))
        .respond_with(ResponseTemplate::new(200).set_body_string("registered"))
        .mount(&server)
        .await;

    let result = dispatcher_for(&server)
        .call_tool(
            "register",
            json!({"username": "neo", "password": "pw"}),
            &CallContext::default(),
        )
        .await;
    assert_eq!(result.content, "RESULT: registered");
}

#[tokio::test]
async fn failed_login_reports_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid credentials"})),
        )
        .mount(&server)
        .await;
    let dispatcher = dispatcher_for(&server);

    let result = dispatcher
        .call_tool(
            "login",
            json!({"username": "neo", "password": "nope"}),
            &session("s1"),
        )
        .await;
    assert_eq!(result.content, "FAILED: Invalid credentials");
    assert_eq!(dispatcher.bridge.resolve("s1"), None);
}

#[tokio::test]
async fn login_sends_hub_client_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_string_contains("client_id=psx-grid-mcp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "jwt"})))
        .expect(1)
        .mount(&server)
        .await;
    let dispatcher = dispatcher_for(&server);

    let result = dispatcher
        .call_tool(
            "login",
            json!({"username": "neo", "password": "pw"}),
            &session("s9"),
        )
        .await;
    let body: Value = serde_json::from_str(&result.content).unwrap();
    assert_eq!(body, json!({"status": "success", "access_token": "jwt"}));
    assert_eq!(dispatcher.bridge.resolve("s9").as_deref(), Some("jwt"));
}

#[tokio::test]
async fn feed_limit_defaults_to_ten() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/feed"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let result = dispatcher_for(&server)
        .call_tool("echo_get_feed", json!({}), &CallContext::default())
        .await;
    assert_eq!(result.content, "[]");
}

#[tokio::test]
async fn login_then_call_on_same_session_reuses_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "jwt-s1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/balance"))
        .and(header("authorization", "Bearer jwt-s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"balance": 100})))
        .expect(1)
        .mount(&server)
        .await;
    let dispatcher = dispatcher_for(&server);

    dispatcher
        .call_tool(
            "login",
            json!({"username": "neo", "password": "pw"}),
            &session("s1"),
        )
        .await;
    assert_eq!(dispatcher.bridge.len(), 1);

    let result = dispatcher
        .call_tool("bank_get_balance", json!({}), &session("s1"))
        .await;
    assert!(!result.is_error, "{}", result.content);
    assert_eq!(dispatcher.bridge.len(), 1);
}
