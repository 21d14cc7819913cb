//! JSON-RPC 2.0 method handling for the streaming MCP transport.
//!
//! Replies are `rmcp` model types. The incoming envelope is read loosely
//! (`id`, `method`, `params`) so an unsupported method still gets a
//! -32601 carrying its id; params are then decoded into the `rmcp` type
//! for the method.

use crate::hub::ToolDescriptor;
use crate::hub::dispatch::{CallContext, ToolDispatcher, ToolResult};
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, EmptyResult, ErrorCode, ErrorData,
    JsonObject, ListToolsResult, ProtocolVersion, RequestId, ServerCapabilities, ServerInfo,
    ServerJsonRpcMessage, ServerResult, Tool,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

pub const SERVER_NAME: &str = "psx-grid-hub";

/// One message posted to `/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    /// Absent for notifications.
    #[serde(default)]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(default)]
    pub params: Option<JsonObject>,
}

pub fn server_info() -> ServerInfo {
    let mut info = ServerInfo::default();
    info.protocol_version = ProtocolVersion::V_2024_11_05;
    info.capabilities = ServerCapabilities::builder().enable_tools().build();
    info.server_info.name = SERVER_NAME.to_string();
    info.server_info.version = crate::VERSION.to_string();
    info
}

pub fn to_mcp_tool(descriptor: ToolDescriptor) -> Tool {
    let schema = match descriptor.input_schema {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    };
    Tool::new(descriptor.name, descriptor.description, Arc::new(schema))
}

fn to_call_result(result: ToolResult) -> CallToolResult {
    let content = vec![Content::text(result.content)];
    if result.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

/// Handle one message; `None` for notifications, which get no reply.
pub async fn handle(
    dispatcher: &ToolDispatcher,
    message: IncomingMessage,
    ctx: &CallContext,
) -> Option<ServerJsonRpcMessage> {
    let Some(id) = message.id else {
        debug!("notification: {}", message.method);
        return None;
    };

    let result = match message.method.as_str() {
        "initialize" => ServerResult::InitializeResult(server_info()),
        "ping" => ServerResult::EmptyResult(EmptyResult {}),
        "tools/list" => {
            let tools = dispatcher.list_tools().into_iter().map(to_mcp_tool).collect();
            ServerResult::ListToolsResult(ListToolsResult::with_all_items(tools))
        }
        "tools/call" => {
            let params = Value::Object(message.params.unwrap_or_default());
            let call: CallToolRequestParams = match serde_json::from_value(params) {
                Ok(call) => call,
                Err(e) => {
                    let error = ErrorData::new(
                        ErrorCode::INVALID_PARAMS,
                        format!("tools/call: {e}"),
                        None,
                    );
                    return Some(ServerJsonRpcMessage::error(error, Some(id)));
                }
            };
            let arguments = call.arguments.map_or(Value::Null, Value::Object);
            let result = dispatcher.call_tool(&call.name, arguments, ctx).await;
            ServerResult::CallToolResult(to_call_result(result))
        }
        other => {
            let error = ErrorData::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
                None,
            );
            return Some(ServerJsonRpcMessage::error(error, Some(id)));
        }
    };
    Some(ServerJsonRpcMessage::response(result, id))
}
