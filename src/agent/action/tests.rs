use super::*;
use serde_json::json;

#[test]
fn parses_canonical_reply() {
    let decision = parse_decision(
        "THOUGHT: reasoning here\nACTION: {\"name\": \"grid_ping\", \"arguments\": {}}",
    )
    .unwrap();
    assert_eq!(decision.thought, "reasoning here");
    assert_eq!(decision.action, Action::new("grid_ping", json!({})));
}

#[test]
fn missing_action_is_an_error() {
    assert_eq!(
        parse_decision("THOUGHT: I should rest now."),
        Err(ParseError::MissingAction)
    );
    assert_eq!(parse_decision(""), Err(ParseError::MissingAction));
}

#[test]
fn thought_is_optional() {
    let decision = parse_decision("ACTION: {\"name\": \"whoami\"}").unwrap();
    assert_eq!(decision.thought, "");
    assert_eq!(decision.action.arguments, json!({}));
}

#[test]
fn markers_ignore_case_and_spacing() {
    let decision =
        parse_decision("thought :  quiet night\naction :{\"name\":\"sleep\",\"arguments\":{\"minutes\":5}}")
            .unwrap();
    assert_eq!(decision.thought, "quiet night");
    assert_eq!(decision.action.arguments["minutes"], 5);
}

#[test]
fn code_fence_is_stripped() {
    let reply = "THOUGHT: post it\nACTION:\n```json\n{\"name\": \"echo_post\", \"arguments\": {\"title\": \"hi\", \"content\": \"x\"}}\n```";
    let decision = parse_decision(reply).unwrap();
    assert_eq!(decision.action.name, "echo_post");
    assert_eq!(decision.action.arguments["title"], "hi");
}

#[test]
fn trailing_text_after_json_is_ignored() {
    let reply = "THOUGHT: t\nACTION: {\"name\": \"grid_ping\", \"arguments\": {}} and then I wait";
    assert_eq!(parse_decision(reply).unwrap().action.name, "grid_ping");
}

#[test]
fn braces_inside_strings_do_not_confuse_parsing() {
    let reply = r#"ACTION: {"name": "forge_push", "arguments": {"repo_name": "site", "files": {"a.js": "function f() { return '}'; }"}}}"#;
    let decision = parse_decision(reply).unwrap();
    assert_eq!(
        decision.action.arguments["files"]["a.js"],
        "function f() { return '}'; }"
    );
}

#[test]
fn first_well_formed_action_wins() {
    let reply = "THOUGHT: my plan of action: think\nACTION: {\"name\": \"nexus_search\", \"arguments\": {\"query\": \"vox\"}}\nACTION: {\"name\": \"grid_ping\"}";
    let decision = parse_decision(reply).unwrap();
    assert_eq!(decision.action.name, "nexus_search");
    assert_eq!(decision.thought, "my plan of action: think");
}

#[test]
fn word_containing_action_is_not_a_marker() {
    let reply = "THOUGHT: one TRANSACTION: pending\nACTION: {\"name\": \"bank_get_balance\"}";
    let decision = parse_decision(reply).unwrap();
    assert_eq!(decision.thought, "one TRANSACTION: pending");
}

#[test]
fn malformed_json_is_reported() {
    assert!(matches!(
        parse_decision("ACTION: {\"name\": \"grid_ping\", "),
        Err(ParseError::InvalidJson(_))
    ));
}

#[test]
fn shape_is_checked() {
    assert_eq!(
        parse_decision("ACTION: [1, 2]"),
        Err(ParseError::NotAnAction)
    );
    assert_eq!(
        parse_decision("ACTION: {\"arguments\": {}}"),
        Err(ParseError::NotAnAction)
    );
    assert_eq!(
        parse_decision("ACTION: {\"name\": \"x\", \"arguments\": \"y\"}"),
        Err(ParseError::NotAnAction)
    );
}

#[test]
fn compact_json_round_trips_fields() {
    let action = Action::new("sleep", json!({"minutes": 5}));
    let value: Value = serde_json::from_str(&action.to_compact_json()).unwrap();
    assert_eq!(value, json!({"name": "sleep", "arguments": {"minutes": 5}}));
    assert!(!action.to_compact_json().contains('\n'));
}

#[test]
fn parse_errors_map_to_malformed_output() {
    let err = GridError::from(parse_decision("THOUGHT: hmm").unwrap_err());
    assert!(matches!(err, GridError::MalformedOutput(_)));
    assert_eq!(err.to_string(), "malformed model output: no ACTION section found");
    assert!(!err.is_retryable());
}
