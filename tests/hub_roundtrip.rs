mod common;

use common::config_for;
use gridhub::agent::{GridClient, HttpGridClient};
use gridhub::config::Config;
use gridhub::hub::{HubState, ToolKind, build_router};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serve a hub on an ephemeral port whose backends all live at `backend`,
/// and return an agent-side client pointed at it.
async fn spawn_hub(backend: &MockServer) -> HttpGridClient {
    let mut config: Config = config_for(&backend.uri());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(HubState::new(&config));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    config.agents.hub_url = format!("http://{addr}");
    HttpGridClient::new(&config)
}

#[tokio::test]
async fn agent_sees_full_catalog() {
    let backend = MockServer::start().await;
    let grid = spawn_hub(&backend).await;

    let tools = grid.list_tools().await.unwrap();
    assert_eq!(tools.len(), ToolKind::ALL.len());
    assert!(tools.iter().any(|t| t.name == "forge_push"));
}

#[tokio::test]
async fn unauthenticated_call_never_reaches_backend() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/balance"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;
    let grid = spawn_hub(&backend).await;

    let result = grid
        .call_tool("bank_get_balance", &json!({}), None)
        .await
        .unwrap();
    assert!(result.is_error);
    assert_eq!(result.content, "ERROR: Authentication required.");
}

#[tokio::test]
async fn credential_travels_to_backend() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/balance"))
        .and(header("authorization", "Bearer agent-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"balance": 42.5})))
        .expect(1)
        .mount(&backend)
        .await;
    let grid = spawn_hub(&backend).await;

    let result = grid
        .call_tool("bank_get_balance", &json!({}), Some("agent-jwt"))
        .await
        .unwrap();
    assert!(!result.is_error);
    assert_eq!(result.content, "{\n  \"balance\": 42.5\n}");
}

#[tokio::test]
async fn unknown_tool_is_a_result_not_a_failure() {
    let backend = MockServer::start().await;
    let grid = spawn_hub(&backend).await;

    let result = grid
        .call_tool("launch_missiles", &json!({}), Some("jwt"))
        .await
        .unwrap();
    assert!(result.is_error);
    assert_eq!(result.content, "Unknown tool: launch_missiles");
}

#[tokio::test]
async fn backend_failure_becomes_error_result() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pay"))
        .and(body_string_contains("\"recipient\":\"trinity\""))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Insufficient funds"})),
        )
        .mount(&backend)
        .await;
    let grid = spawn_hub(&backend).await;

    let result = grid
        .call_tool(
            "bank_transfer",
            &json!({"recipient": "trinity", "amount": "10"}),
            Some("jwt"),
        )
        .await
        .unwrap();
    assert!(result.is_error);
    assert!(result.content.contains("Insufficient funds"), "{}", result.content);
}

#[tokio::test]
async fn agent_login_goes_to_identity_directly() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh"})))
        .expect(1)
        .mount(&backend)
        .await;
    let grid = spawn_hub(&backend).await;

    assert_eq!(grid.login("neo", "pw").await.unwrap(), "fresh");
}
