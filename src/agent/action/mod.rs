//! Parsing of the model's `THOUGHT: ... ACTION: {...}` reply.
//!
//! The grammar: an optional `THOUGHT:` section, then an `ACTION:` marker
//! followed by exactly one JSON object `{"name": ..., "arguments": {...}}`,
//! optionally wrapped in a markdown code fence. Markers are
//! case-insensitive. When several `ACTION:` markers appear, the first one
//! followed by a well-formed action wins; the thought is the text between
//! the nearest preceding `THOUGHT:` and that marker.

use crate::errors::GridError;
use crate::utils::regex::RegexPatterns;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub name: String,
    pub arguments: Value,
}

impl Action {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// `{"name": ..., "arguments": ...}` on one line.
    pub fn to_compact_json(&self) -> String {
        serde_json::json!({"name": self.name, "arguments": self.arguments}).to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub thought: String,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no ACTION section found")]
    MissingAction,
    #[error("ACTION is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("ACTION must be an object with a string `name` and object `arguments`")]
    NotAnAction,
}

impl From<ParseError> for GridError {
    fn from(e: ParseError) -> Self {
        Self::MalformedOutput(e.to_string())
    }
}

pub fn parse_decision(text: &str) -> Result<Decision, ParseError> {
    let mut first_error = None;
    for marker in RegexPatterns::action_marker().find_iter(text) {
        match parse_action(&text[marker.end()..]) {
            Ok(action) => {
                let thought = thought_before(&text[..marker.start()]);
                return Ok(Decision { thought, action });
            }
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    Err(first_error.unwrap_or(ParseError::MissingAction))
}

fn thought_before(prefix: &str) -> String {
    RegexPatterns::thought_marker()
        .find_iter(prefix)
        .last()
        .map(|m| prefix[m.end()..].trim().to_string())
        .unwrap_or_default()
}

fn parse_action(tail: &str) -> Result<Action, ParseError> {
    let tail = tail.trim_start();
    let body = match RegexPatterns::code_fence_open().find(tail) {
        Some(fence) => &tail[fence.end()..],
        None => tail,
    };

    let value = serde_json::Deserializer::from_str(body)
        .into_iter::<Value>()
        .next()
        .ok_or(ParseError::MissingAction)?
        .map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let Value::Object(mut object) = value else {
        return Err(ParseError::NotAnAction);
    };
    let name = match object.remove("name") {
        Some(Value::String(name)) if !name.trim().is_empty() => name.trim().to_string(),
        _ => return Err(ParseError::NotAnAction),
    };
    let arguments = match object.remove("arguments") {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(args @ Value::Object(_)) => args,
        Some(_) => return Err(ParseError::NotAnAction),
    };
    Ok(Action { name, arguments })
}

#[cfg(test)]
mod tests;
