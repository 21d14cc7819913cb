use super::*;
use serde_json::json;

#[test]
fn names_round_trip_through_from_name() {
    for kind in ToolKind::ALL {
        assert_eq!(ToolKind::from_name(kind.name()), Some(*kind));
    }
    assert_eq!(ToolKind::from_name("bank_rob"), None);
    assert_eq!(ToolKind::from_name("GRID_PING"), None);
}

#[test]
fn catalog_has_every_kind_once() {
    let tools = catalog();
    assert_eq!(tools.len(), ToolKind::ALL.len());
    let mut names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), tools.len());
}

#[test]
fn every_schema_is_an_object_schema() {
    for tool in catalog() {
        assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
        assert!(tool.input_schema["properties"].is_object(), "{}", tool.name);
    }
}

#[test]
fn descriptor_serializes_input_schema_in_camel_case() {
    let json = serde_json::to_value(ToolKind::NexusSearch.descriptor()).unwrap();
    assert_eq!(json["name"], "nexus_search");
    assert_eq!(json["inputSchema"]["required"], json!(["query"]));
}

#[test]
fn anonymous_tools() {
    let anonymous: Vec<_> = ToolKind::ALL
        .iter()
        .filter(|k| !k.requires_auth())
        .map(|k| k.name())
        .collect();
    assert_eq!(
        anonymous,
        [
            "grid_ping",
            "register",
            "login",
            "whoami",
            "echo_get_feed",
            "echo_list_frequencies",
            "nexus_search"
        ]
    );
}

#[test]
fn null_arguments_count_as_empty() {
    assert_eq!(
        ToolCall::parse(ToolKind::GridPing, Value::Null).unwrap(),
        ToolCall::GridPing
    );
    assert_eq!(
        ToolCall::parse(ToolKind::EchoGetFeed, Value::Null).unwrap(),
        ToolCall::EchoGetFeed(LimitArgs { limit: None })
    );
}

#[test]
fn non_object_arguments_are_rejected() {
    let err = ToolCall::parse(ToolKind::GridPing, json!([1, 2])).unwrap_err();
    assert!(matches!(err, GridError::InvalidArguments { .. }));
}

#[test]
fn missing_required_field_is_invalid() {
    let err = ToolCall::parse(ToolKind::MailSend, json!({"recipient": "neo"})).unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("invalid arguments for mail_send"), "{msg}");
    assert!(msg.contains("subject"), "{msg}");
}

#[test]
fn integers_accept_numeric_strings() {
    let call = ToolCall::parse(
        ToolKind::EchoComment,
        json!({"post_id": "12", "content": "agreed", "parent_id": 3}),
    )
    .unwrap();
    assert_eq!(
        call,
        ToolCall::EchoComment(CommentArgs {
            post_id: 12,
            content: "agreed".into(),
            parent_id: Some(3),
        })
    );

    let call = ToolCall::parse(ToolKind::MailListInbox, json!({"limit": "5"})).unwrap();
    assert_eq!(call, ToolCall::MailListInbox(LimitArgs { limit: Some(5) }));
}

#[test]
fn non_numeric_string_is_invalid() {
    let err = ToolCall::parse(ToolKind::MailReadEmail, json!({"email_id": "latest"})).unwrap_err();
    assert!(matches!(err, GridError::InvalidArguments { .. }));
}

#[test]
fn resonate_checks_enums() {
    let ok = ToolCall::parse(
        ToolKind::EchoResonate,
        json!({"item_type": "post", "item_id": 4, "value": -1}),
    )
    .unwrap();
    let ToolCall::EchoResonate(args) = ok else {
        panic!("wrong variant");
    };
    assert_eq!(args.item_type.as_str(), "post");

    assert!(
        ToolCall::parse(
            ToolKind::EchoResonate,
            json!({"item_type": "user", "item_id": 4, "value": 1}),
        )
        .is_err()
    );
    assert!(
        ToolCall::parse(
            ToolKind::EchoResonate,
            json!({"item_type": "post", "item_id": 4, "value": 5}),
        )
        .is_err()
    );
}

#[test]
fn semantic_checks_are_left_to_the_backend() {
    for (kind, args) in [
        (ToolKind::BankTransfer, json!({"recipient": "", "amount": -3})),
        (ToolKind::EchoPost, json!({"title": " ", "content": ""})),
        (ToolKind::MailSend, json!({"recipient": "", "subject": "", "body": ""})),
        (
            ToolKind::ForgeCreateRepo,
            json!({"name": "name with spaces and far more than one hundred characters ".repeat(3)}),
        ),
    ] {
        assert!(ToolCall::parse(kind, args.clone()).is_ok(), "{args}");
    }
}

#[test]
fn transfer_amount_accepts_numeric_strings() {
    let call = ToolCall::parse(
        ToolKind::BankTransfer,
        json!({"recipient": "trinity", "amount": "12.5"}),
    )
    .unwrap();
    let ToolCall::BankTransfer(args) = call else {
        panic!("wrong variant");
    };
    assert!((args.amount - 12.5).abs() < f64::EPSILON);
    assert!(
        ToolCall::parse(
            ToolKind::BankTransfer,
            json!({"recipient": "trinity", "amount": "lots"}),
        )
        .is_err()
    );
}

#[test]
fn post_frequency_defaults_to_main() {
    let call = ToolCall::parse(ToolKind::EchoPost, json!({"title": "t", "content": "c"})).unwrap();
    let ToolCall::EchoPost(args) = call else {
        panic!("wrong variant");
    };
    assert_eq!(args.frequency, "main");
}

#[test]
fn push_checks_types_and_defaults_the_message() {
    let ok = ToolCall::parse(
        ToolKind::ForgePush,
        json!({"repo_name": "site", "files": {"index.html": "<h1>hi</h1>"}}),
    )
    .unwrap();
    let ToolCall::ForgePush(args) = ok else {
        panic!("wrong variant");
    };
    assert_eq!(args.commit_message, "Automated update from Agent");

    for bad in [
        json!({"repo_name": "site"}),
        json!({"repo_name": "site", "files": {"a": 1}}),
        json!({"repo_name": 7, "files": {"a": "b"}}),
    ] {
        assert!(ToolCall::parse(ToolKind::ForgePush, bad.clone()).is_err(), "{bad}");
    }
}

#[test]
fn private_flag_accepts_strings() {
    let call = ToolCall::parse(
        ToolKind::ForgeCreateRepo,
        json!({"name": "vault", "private": "true"}),
    )
    .unwrap();
    assert_eq!(
        call,
        ToolCall::ForgeCreateRepo(CreateRepoArgs {
            name: "vault".into(),
            description: None,
            private: true,
        })
    );
}

#[test]
fn kind_matches_parsed_variant() {
    for kind in ToolKind::ALL {
        if let Ok(call) = ToolCall::parse(*kind, json!({})) {
            assert_eq!(call.kind(), *kind);
        }
    }
}
