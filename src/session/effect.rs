//! Effects produced by state transitions

use super::state::Side;
use crate::backend::{MenuOptions, OutboundRequest};
use crate::reply::{FailureKind, ReplyFailure};
use std::sync::Arc;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Anchor and options were cleared by a greeting
    ContextReset { previous_anchor: Option<String> },

    /// Record a turn in the transcript
    AppendTurn {
        side: Side,
        text: String,
        options: MenuOptions,
        failure: Option<FailureKind>,
    },

    /// Send the request to the backend
    SendRequest(OutboundRequest),
}

impl Effect {
    pub fn user_turn(text: impl Into<String>) -> Self {
        Effect::AppendTurn {
            side: Side::User,
            text: text.into(),
            options: Arc::from(Vec::new()),
            failure: None,
        }
    }

    pub fn bot_turn(text: impl Into<String>, options: MenuOptions) -> Self {
        Effect::AppendTurn {
            side: Side::Bot,
            text: text.into(),
            options,
            failure: None,
        }
    }

    pub fn error_turn(failure: &ReplyFailure) -> Self {
        Effect::AppendTurn {
            side: Side::Bot,
            text: failure.user_message(),
            options: Arc::from(Vec::new()),
            failure: Some(failure.kind),
        }
    }
}
