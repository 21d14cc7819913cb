//! Tools the agent runtime handles itself instead of forwarding to the hub.
//!
//! `login` has to work before any credential exists, and `sleep` only
//! touches local state, so neither goes through the dispatcher.

use crate::agent::action::Action;
use crate::errors::GridError;
use crate::hub::ToolDescriptor;
use serde_json::{Value, json};

pub const LOGIN: &str = "login";
pub const SLEEP: &str = "sleep";
pub const DEFAULT_SLEEP_MINUTES: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalTool {
    /// Missing fields fall back to the agent's handle and profile password.
    Login {
        username: Option<String>,
        password: Option<String>,
    },
    Sleep {
        minutes: u64,
    },
}

impl LocalTool {
    /// `None` when the action belongs to the hub.
    pub fn from_action(action: &Action) -> Option<Result<Self, GridError>> {
        let args = &action.arguments;
        match action.name.as_str() {
            LOGIN => Some(Ok(Self::Login {
                username: string_arg(args, "username"),
                password: string_arg(args, "password"),
            })),
            SLEEP => Some(sleep_minutes(args.get("minutes")).map(|minutes| Self::Sleep { minutes })),
            _ => None,
        }
    }
}

fn string_arg(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn sleep_minutes(raw: Option<&Value>) -> Result<u64, GridError> {
    let invalid = |v: &Value| {
        GridError::invalid_arguments(SLEEP, format!("minutes must be a non-negative integer, got {v}"))
    };
    let Some(v) = raw.filter(|v| !v.is_null()) else {
        return Ok(DEFAULT_SLEEP_MINUTES);
    };
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
            .ok_or_else(|| invalid(v)),
        Value::String(s) => s.trim().parse::<u64>().map_err(|_| invalid(v)),
        _ => Err(invalid(v)),
    }
}

pub fn login_success(username: &str) -> String {
    json!({"status": "success", "message": format!("Authenticated as {username}")}).to_string()
}

pub fn login_failure(err: &GridError) -> String {
    let message = match err {
        GridError::Backend { message, .. } => message.clone(),
        other => other.to_string(),
    };
    json!({"status": "error", "message": message}).to_string()
}

pub fn sleep_result(minutes: u64) -> String {
    json!({"status": "success", "message": format!("Sleeping for {minutes} minutes.")}).to_string()
}

pub fn descriptors() -> [ToolDescriptor; 2] {
    [
        ToolDescriptor {
            name: LOGIN.to_string(),
            description:
                "Authenticate with the PSX Grid. Call this if you get an Unauthorized error."
                    .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "username": {"type": "string"},
                    "password": {"type": "string"}
                },
                "required": ["username", "password"]
            }),
        },
        ToolDescriptor {
            name: SLEEP.to_string(),
            description: "Go dormant for a specified number of minutes to save energy.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "minutes": {"type": "integer", "default": DEFAULT_SLEEP_MINUTES}
                }
            }),
        },
    ]
}

/// Hub catalog followed by the local tools; a local tool replaces any
/// hub entry with the same name.
pub fn merge_catalog(hub: Vec<ToolDescriptor>) -> Vec<ToolDescriptor> {
    let mut merged: Vec<ToolDescriptor> = hub
        .into_iter()
        .filter(|t| t.name != LOGIN && t.name != SLEEP)
        .collect();
    merged.extend(descriptors());
    merged
}
