//! Property-based tests for reply normalization
//!
//! - Well-formed success bodies survive normalization without loss or
//!   reordering of options
//! - Any payload normalizes to a reply; failures always carry detail
//! - Explicit failure flags win over any reply text

use super::*;
use crate::backend::{MenuOption, RawResponse, TransportError};
use proptest::prelude::*;
use serde_json::{json, Value};

// ============================================================================
// Strategies
// ============================================================================

fn arb_menu_option() -> impl Strategy<Value = MenuOption> {
    (
        "[a-z0-9]{4,12}",
        "[A-Za-z ]{1,30}",
        1i64..50,
        "[A-Za-z .]{0,40}",
        any::<bool>(),
        proptest::option::of("[0-9]{1,4}"),
    )
        .prop_map(
            |(id, title, ordinal, response_text, is_root, parent_id)| MenuOption {
                id,
                title,
                ordinal,
                response_text,
                is_root,
                parent_id,
                created_at: "2025-01-01T00:00:00Z".to_string(),
                documents: vec![],
            },
        )
}

/// Reply text with at least one visible character
fn arb_reply_text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 .,!?]{0,80}"
}

/// Anchor field: absent, explicit null, or an id
fn arb_anchor() -> impl Strategy<Value = Option<Option<String>>> {
    prop_oneof![
        Just(None),
        Just(Some(None)),
        "[0-9]{1,6}".prop_map(|id| Some(Some(id))),
    ]
}

fn arb_json_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-100i64..100).prop_map(|n| json!(n)),
        "[a-zA-Z<>!/ ]{0,30}".prop_map(Value::String),
    ]
}

fn arb_raw_response() -> impl Strategy<Value = RawResponse> {
    (
        prop_oneof![Just(200u16), Just(201), Just(400), Just(404), Just(500)],
        proptest::option::of(prop_oneof![
            Just("application/json".to_string()),
            Just("text/html".to_string()),
            Just("text/plain".to_string()),
        ]),
        prop_oneof![
            "[a-zA-Z{}\\[\\]\":, <>!]{0,60}",
            proptest::collection::hash_map("[a-zA-Z]{1,10}", arb_json_scalar(), 0..5)
                .prop_map(|m| Value::Object(m.into_iter().collect()).to_string()),
        ],
    )
        .prop_map(|(status, content_type, body)| RawResponse::new(status, content_type.as_deref(), body))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_success_body_round_trips(
        text in arb_reply_text(),
        options in proptest::collection::vec(arb_menu_option(), 0..6),
        anchor in arb_anchor(),
    ) {
        let mut body = json!({
            "success": true,
            "response": text,
            "menuItems": options,
            "timestamp": "2025-01-01T00:00:00Z",
        });
        if let Some(anchor) = &anchor {
            body["parentMenuId"] = json!(anchor);
        }

        let reply = normalize(Ok(RawResponse::json(body.to_string())));
        let ConversationReply::Success(content) = reply else {
            return Err(TestCaseError::fail("well-formed body was rejected"));
        };

        prop_assert_eq!(&content.text, &text);
        prop_assert_eq!(&content.options[..], &options[..]);
        let expected_anchor = match anchor {
            None => AnchorUpdate::Unchanged,
            Some(None) => AnchorUpdate::Root,
            Some(Some(id)) => AnchorUpdate::At(id),
        };
        prop_assert_eq!(content.anchor, expected_anchor);
    }

    #[test]
    fn prop_normalize_is_total(raw in arb_raw_response()) {
        match normalize(Ok(raw.clone())) {
            ConversationReply::Success(content) => {
                prop_assert!(raw.is_success());
                prop_assert!(!content.text.trim().is_empty());
            }
            ConversationReply::Failure(failure) => {
                prop_assert!(!failure.detail.is_empty());
                prop_assert!(!failure.user_message().is_empty());
            }
        }
    }

    #[test]
    fn prop_non_success_status_is_bad_gateway(
        status in 300u16..600,
        body in "[a-zA-Z{}\" ]{0,40}",
    ) {
        let reply = normalize(Ok(RawResponse::new(status, Some("application/json"), body)));
        let kind = reply.failure().map(|f| f.kind);
        let is_bad_gateway = matches!(kind, Some(FailureKind::BadGateway(_)));
        prop_assert!(is_bad_gateway, "expected bad gateway, got {:?}", kind);
    }

    #[test]
    fn prop_explicit_failure_wins(
        text in arb_reply_text(),
        options in proptest::collection::vec(arb_menu_option(), 0..3),
    ) {
        let body = json!({ "success": false, "response": text, "menuItems": options });
        let reply = normalize(Ok(RawResponse::json(body.to_string())));
        prop_assert_eq!(
            reply.failure().map(|f| f.kind),
            Some(FailureKind::ServerReportedFailure)
        );
    }

    #[test]
    fn prop_transport_errors_never_succeed(message in "[a-z ]{0,30}", timeout in any::<bool>()) {
        let err = if timeout {
            TransportError::timeout(message)
        } else {
            TransportError::unreachable(message)
        };
        let kind = normalize(Err(err)).failure().map(|f| f.kind);
        let expected = if timeout { FailureKind::Timeout } else { FailureKind::NetworkUnreachable };
        prop_assert_eq!(kind, Some(expected));
    }
}
