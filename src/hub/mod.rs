//! The MCP hub: tool catalog, session bridge, dispatch and HTTP surface.

pub mod dispatch;
pub mod forge_push;
pub mod server;
pub mod session;
pub mod tools;
pub mod web;

pub use dispatch::{CallContext, ToolDispatcher, ToolResult, normalize};
pub use server::{HubState, build_router, serve};
pub use session::SessionBridge;
pub use tools::{ToolCall, ToolDescriptor, ToolKind, catalog};
