//! Property-based tests for the session state machine
//!
//! These tests verify the navigation invariants hold for any context and
//! any reply.

use super::effect::Effect;
use super::state::*;
use super::transition::*;
use super::Event;
use crate::backend::{MenuOption, MenuOptions};
use crate::reply::{
    AnchorUpdate, ConversationReply, FailureKind, GatewayStatus, ReplyContent, ReplyFailure,
};
use chrono::Utc;
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_menu_option() -> impl Strategy<Value = MenuOption> {
    ("[a-z0-9]{4,8}", "[A-Za-z ]{1,20}", 1i64..20).prop_map(|(id, title, ordinal)| MenuOption {
        id,
        title,
        ordinal,
        response_text: String::new(),
        is_root: false,
        parent_id: None,
        created_at: String::new(),
        documents: vec![],
    })
}

fn arb_options(max: usize) -> impl Strategy<Value = MenuOptions> {
    proptest::collection::vec(arb_menu_option(), 0..max).prop_map(Arc::from)
}

fn arb_idle_state() -> impl Strategy<Value = NavigationState> {
    (proptest::option::of("[0-9]{1,4}"), arb_options(5)).prop_map(|(anchor_id, options)| {
        NavigationState {
            phase: Phase::Idle,
            anchor_id,
            last_menu_options: options,
        }
    })
}

fn arb_sending_state() -> impl Strategy<Value = NavigationState> {
    arb_idle_state().prop_map(|state| NavigationState {
        phase: Phase::Sending,
        ..state
    })
}

fn arb_greeting() -> impl Strategy<Value = String> {
    (
        prop_oneof![
            Just("hi"),
            Just("Hello"),
            Just("HEY"),
            Just("good morning"),
            Just("Good Evening"),
            Just("greetings"),
        ],
        "[ !.]{0,3}",
    )
        .prop_map(|(word, tail)| format!("{word}{tail}"))
}

/// Text that is never a greeting
fn arb_menu_input() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u32..20).prop_map(|n| n.to_string()),
        "[0-9][a-z0-9 ]{0,15}",
    ]
}

fn arb_anchor_update() -> impl Strategy<Value = AnchorUpdate> {
    prop_oneof![
        Just(AnchorUpdate::Unchanged),
        Just(AnchorUpdate::Root),
        "[0-9]{1,4}".prop_map(AnchorUpdate::At),
    ]
}

fn arb_failure_kind() -> impl Strategy<Value = FailureKind> {
    prop_oneof![
        Just(FailureKind::NetworkUnreachable),
        Just(FailureKind::Timeout),
        Just(FailureKind::BadGateway(GatewayStatus::NotFound)),
        (500u16..600).prop_map(|s| FailureKind::BadGateway(GatewayStatus::ServerError(s))),
        Just(FailureKind::MalformedPayload),
        Just(FailureKind::ServerReportedFailure),
        Just(FailureKind::MissingField),
    ]
}

fn arb_failure() -> impl Strategy<Value = ConversationReply> {
    (arb_failure_kind(), "[a-z ]{0,30}")
        .prop_map(|(kind, detail)| ConversationReply::Failure(ReplyFailure::new(kind, detail)))
}

fn arb_success() -> impl Strategy<Value = ConversationReply> {
    ("[A-Za-z][A-Za-z .]{0,40}", arb_options(4), arb_anchor_update()).prop_map(
        |(text, options, anchor)| {
            ConversationReply::Success(ReplyContent {
                text,
                options,
                anchor,
                timestamp: Utc::now(),
                menu_context: None,
            })
        },
    )
}

fn arb_reply() -> impl Strategy<Value = ConversationReply> {
    prop_oneof![arb_success(), arb_failure()]
}

fn appended_turns(effects: &[Effect]) -> Vec<Side> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::AppendTurn { side, .. } => Some(*side),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_greeting_clears_context_before_request(
        state in arb_idle_state(),
        greeting in arb_greeting(),
    ) {
        let result = transition(&state, Event::UserText { text: greeting }).unwrap();

        let reset_first = matches!(result.effects.first(), Some(Effect::ContextReset { .. }));
        prop_assert!(reset_first);
        let request = result.effects.iter().find_map(|e| match e {
            Effect::SendRequest(r) => Some(r),
            _ => None,
        });
        let request = request.expect("greeting must send a request");
        prop_assert_eq!(request.anchor_id.as_ref(), None);
        prop_assert!(request.last_options.is_empty());
        prop_assert_eq!(result.new_state.anchor_id, None);
    }

    #[test]
    fn prop_menu_input_carries_context(
        state in arb_idle_state(),
        input in arb_menu_input(),
    ) {
        let result = transition(&state, Event::UserText { text: input.clone() }).unwrap();

        prop_assert_eq!(result.new_state.phase, Phase::Sending);
        prop_assert_eq!(appended_turns(&result.effects), vec![Side::User]);
        match result.effects.last() {
            Some(Effect::SendRequest(request)) => {
                prop_assert_eq!(&request.message, input.trim());
                prop_assert_eq!(&request.anchor_id, &state.anchor_id);
                prop_assert_eq!(&request.last_options, &state.last_menu_options);
            }
            other => prop_assert!(false, "expected SendRequest last, got {:?}", other),
        }
    }

    #[test]
    fn prop_sending_rejects_all_input(
        state in arb_sending_state(),
        input in "[a-z0-9 ]{0,20}",
    ) {
        let result = transition(&state, Event::UserText { text: input });
        prop_assert!(result.is_err());
    }

    #[test]
    fn prop_failure_preserves_context(
        state in arb_sending_state(),
        reply in arb_failure(),
    ) {
        let result = transition(&state, Event::ReplyReceived { reply }).unwrap();

        prop_assert_eq!(result.new_state.phase, Phase::Idle);
        prop_assert_eq!(&result.new_state.anchor_id, &state.anchor_id);
        prop_assert_eq!(&result.new_state.last_menu_options, &state.last_menu_options);
    }

    #[test]
    fn prop_options_are_sticky(
        state in arb_sending_state(),
        reply in arb_success(),
    ) {
        let offered = reply.options().to_vec();
        let result = transition(&state, Event::ReplyReceived { reply }).unwrap();

        if offered.is_empty() {
            prop_assert_eq!(&result.new_state.last_menu_options, &state.last_menu_options);
        } else {
            prop_assert_eq!(&*result.new_state.last_menu_options, offered.as_slice());
        }
    }

    #[test]
    fn prop_every_reply_adds_one_bot_turn(
        state in arb_sending_state(),
        reply in arb_reply(),
    ) {
        let result = transition(&state, Event::ReplyReceived { reply }).unwrap();

        prop_assert_eq!(result.new_state.phase, Phase::Idle);
        prop_assert_eq!(appended_turns(&result.effects), vec![Side::Bot]);
    }

    #[test]
    fn prop_full_cycle_returns_to_idle(
        state in arb_idle_state(),
        input in arb_menu_input(),
        reply in arb_reply(),
    ) {
        let sent = transition(&state, Event::UserText { text: input }).unwrap();
        let received = transition(&sent.new_state, Event::ReplyReceived { reply }).unwrap();

        let mut turns = appended_turns(&sent.effects);
        turns.extend(appended_turns(&received.effects));
        prop_assert_eq!(turns, vec![Side::User, Side::Bot]);
        prop_assert!(!received.new_state.is_busy());
    }
}
