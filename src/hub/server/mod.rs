//! HTTP surface of the hub.
//!
//! Two transports share one [`ToolDispatcher`]:
//! - `GET /tools` + `POST /call`: plain request/response, used by agents.
//! - `GET /sse` + `POST /messages`: MCP over server-sent events. The
//!   stream's first event names the message endpoint (with a fresh session
//!   id); JSON-RPC replies to posted messages are delivered on the stream.

pub mod rpc;

use crate::config::Config;
use crate::hub::dispatch::{CallContext, ToolDispatcher, ToolResult};
use crate::hub::session::SessionBridge;
use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Buffered JSON-RPC replies per SSE stream.
const STREAM_BUFFER: usize = 32;

const SESSION_HEADER: &str = "x-session-id";

type StreamMap = Arc<Mutex<HashMap<String, mpsc::Sender<String>>>>;

#[derive(Clone)]
pub struct HubState {
    dispatcher: Arc<ToolDispatcher>,
    streams: StreamMap,
    discovery: Arc<Discovery>,
}

struct Discovery {
    identity: String,
    public_url: String,
    client_id: String,
}

impl HubState {
    pub fn new(config: &Config) -> Self {
        let bridge = Arc::new(SessionBridge::new(config.hub.global_credential_fallback));
        Self {
            dispatcher: Arc::new(ToolDispatcher::new(config, bridge)),
            streams: Arc::new(Mutex::new(HashMap::new())),
            discovery: Arc::new(Discovery {
                identity: config.services.identity.trim_end_matches('/').to_string(),
                public_url: config.hub.public_url.trim_end_matches('/').to_string(),
                client_id: config.hub.client_id.clone(),
            }),
        }
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    fn stream_sender(&self, session_id: &str) -> Option<mpsc::Sender<String>> {
        self.streams
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(session_id)
            .cloned()
    }

    fn drop_stream(&self, session_id: &str) {
        self.streams
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(session_id);
    }
}

pub fn build_router(state: HubState) -> Router {
    Router::new()
        .route("/tools", get(list_tools_handler))
        .route("/call", post(call_handler))
        .route("/sse", get(sse_handler))
        .route("/messages", post(messages_handler))
        .route(
            "/.well-known/mcp-auth-configuration",
            get(auth_configuration_handler),
        )
        .route(
            "/.well-known/oauth-protected-resource",
            get(protected_resource_handler),
        )
        .route("/api/health", get(health_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

/// Bind and serve until `shutdown` resolves.
pub async fn serve(config: &Config, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
    if which::which("git").is_err() {
        warn!("git not found on PATH; forge_push will fail");
    }
    let app = build_router(HubState::new(config));
    let addr = format!("{}:{}", config.hub.host, config.hub.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind hub on {addr}"))?;
    info!("MCP hub listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("hub server error")?;
    info!("MCP hub stopped");
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct SessionQuery {
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallRequest {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Token from an `Authorization: Bearer ...` header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn header_session(headers: &HeaderMap) -> Option<String> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// GET /tools
async fn list_tools_handler(State(state): State<HubState>) -> impl IntoResponse {
    Json(state.dispatcher.list_tools())
}

/// POST /call: synchronous tool call.
async fn call_handler(
    State(state): State<HubState>,
    Query(query): Query<SessionQuery>,
    headers: HeaderMap,
    Json(body): Json<CallRequest>,
) -> Json<ToolResult> {
    let session_id = query.session_id.or_else(|| header_session(&headers));
    let ctx = CallContext::new(session_id, bearer_token(&headers));
    Json(
        state
            .dispatcher
            .call_tool(&body.name, body.arguments, &ctx)
            .await,
    )
}

/// Removes the session's reply channel when the SSE stream is dropped.
struct StreamGuard {
    session_id: String,
    streams: StreamMap,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.streams
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&self.session_id);
        debug!("SSE session {} closed", self.session_id);
    }
}

/// GET /sse: open an MCP session.
async fn sse_handler(
    State(state): State<HubState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session_id = Uuid::new_v4().simple().to_string();
    let (tx, rx) = mpsc::channel::<String>(STREAM_BUFFER);
    state
        .streams
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .insert(session_id.clone(), tx);
    info!("SSE session {} opened", session_id);

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("/messages?session_id={session_id}"));
    let guard = StreamGuard {
        session_id,
        streams: state.streams.clone(),
    };
    let messages = ReceiverStream::new(rx).map(move |message| {
        let _guard = &guard;
        Ok(Event::default().event("message").data(message))
    });
    let events = stream::once(async move { Ok(endpoint) }).chain(messages);
    Sse::new(events).keep_alive(KeepAlive::default())
}

/// POST /messages?session_id=: JSON-RPC in, reply on the SSE stream.
async fn messages_handler(
    State(state): State<HubState>,
    Query(query): Query<SessionQuery>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(session_id) = query.session_id.filter(|s| !s.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "session_id is required"})),
        )
            .into_response();
    };
    let Some(sender) = state.stream_sender(&session_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Unknown session"})),
        )
            .into_response();
    };

    let ctx = CallContext::new(Some(session_id.clone()), bearer_token(&headers));
    state.dispatcher.observe(&ctx);

    let message: rpc::IncomingMessage = match serde_json::from_value(body) {
        Ok(req) => req,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": format!("invalid JSON-RPC message: {e}")})),
            )
                .into_response();
        }
    };

    if let Some(reply) = rpc::handle(&state.dispatcher, message, &ctx).await {
        let text = serde_json::to_string(&reply).unwrap_or_default();
        if sender.send(text).await.is_err() {
            warn!("SSE session {} went away before its reply", session_id);
            state.drop_stream(&session_id);
            return (
                StatusCode::GONE,
                Json(json!({"error": "Session closed"})),
            )
                .into_response();
        }
    }
    StatusCode::ACCEPTED.into_response()
}

async fn auth_configuration_handler(State(state): State<HubState>) -> impl IntoResponse {
    let d = &state.discovery;
    Json(json!({
        "authorization_endpoint": format!("{}/authorize/agent", d.identity),
        "token_endpoint": format!("{}/token", d.identity),
        "client_id": d.client_id,
    }))
}

async fn protected_resource_handler(State(state): State<HubState>) -> impl IntoResponse {
    let d = &state.discovery;
    Json(json!({
        "resource": format!("{}/sse", d.public_url),
        "authorization_servers": [d.identity],
        "client_id": d.client_id,
    }))
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({"status": "ok", "version": crate::VERSION}))
}

async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Not Found"})))
}
