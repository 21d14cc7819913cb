use super::*;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ServiceClient {
    ServiceClient::new(ServicesConfig::all_at(&server.uri()), Duration::from_secs(5))
}

#[test]
fn error_detail_prefers_fastapi_detail() {
    assert_eq!(error_detail(r#"{"detail": "Invalid credentials"}"#), "Invalid credentials");
    assert_eq!(
        error_detail(r#"{"detail": [{"loc": ["query"]}]}"#),
        r#"[{"loc":["query"]}]"#
    );
    assert_eq!(error_detail("  "), "(empty response)");
    assert_eq!(error_detail(&"x".repeat(500)).len(), MAX_ERROR_DETAIL_CHARS);
}

#[test]
fn payload_detects_json() {
    assert_eq!(Payload::from_body("[1]".into()), Payload::Json(json!([1])));
    assert_eq!(
        Payload::from_body("<html>".into()),
        Payload::Text("<html>".into())
    );
}

#[test]
fn forge_remote_embeds_token_and_path() {
    let client = ServiceClient::new(
        ServicesConfig::all_at("http://forge.psx"),
        Duration::from_secs(5),
    );
    let url = client.forge_remote("tok123", "neo", "site").unwrap();
    assert_eq!(url.as_str(), "http://tok123@forge.psx/neo/site.git");
}

#[tokio::test]
async fn bank_balance_sends_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/balance"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"balance": 42.0})))
        .expect(1)
        .mount(&server)
        .await;

    let payload = client_for(&server).bank_balance("tok").await.unwrap();
    let Payload::Json(body) = payload else {
        panic!("expected JSON, got {payload:?}");
    };
    assert_eq!(body["balance"], 42.0);
}

#[tokio::test]
async fn non_success_status_becomes_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pay"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Insufficient funds"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .bank_pay("tok", "trinity", 1000.0, None)
        .await
        .unwrap_err();
    match err {
        GridError::Backend {
            service,
            status,
            message,
        } => {
            assert_eq!(service, "bank");
            assert_eq!(status, 400);
            assert_eq!(message, "Insufficient funds");
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let client = ServiceClient::new(
        ServicesConfig::all_at(&server.uri()),
        Duration::from_millis(100),
    );
    let err = client.echo_frequencies().await.unwrap_err();
    assert!(matches!(err, GridError::Timeout { .. }), "{err:?}");
    assert_eq!(err.to_string(), "echo timed out");
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    // Port 9 (discard) is essentially never listening locally.
    let client = ServiceClient::new(
        ServicesConfig::all_at("http://127.0.0.1:9"),
        Duration::from_secs(2),
    );
    let err = client.search("anything").await.unwrap_err();
    assert!(
        matches!(err, GridError::Transport { .. } | GridError::Timeout { .. }),
        "{err:?}"
    );
}

#[tokio::test]
async fn echo_post_maps_frequency_to_subreddit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/post"))
        .and(query_param("title", "Hello"))
        .and(query_param("subreddit", "main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "posted"})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .echo_post("tok", "Hello", "first light", "main")
        .await
        .unwrap();
}

#[tokio::test]
async fn password_token_uses_form_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("client_id=mcp_hub"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "jwt"})))
        .mount(&server)
        .await;

    let token = client_for(&server)
        .password_token("neo", "pw", "mcp_hub")
        .await
        .unwrap();
    assert_eq!(token, "jwt");
}

#[tokio::test]
async fn recent_posts_decodes_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/feed"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "title": "Signal", "author": "morpheus", "score": 3},
            {"id": 6, "title": "Noise", "author": "trinity"}
        ])))
        .mount(&server)
        .await;

    let posts = client_for(&server).recent_posts(2).await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].to_string(), "POST (ID: 7): Signal by morpheus");
}
