//! Pure state transition function
//!
//! Given the same state and event, always produces the same next state and
//! effects, with no I/O.

use super::input::is_greeting;
use super::state::{NavigationState, Phase};
use super::{Effect, Event};
use crate::backend::OutboundRequest;
use crate::reply::ConversationReply;
use std::sync::Arc;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: NavigationState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: NavigationState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A message is already being sent, wait for the reply")]
    Busy,
    #[error("Message is empty")]
    EmptyInput,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

pub fn transition(
    state: &NavigationState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state.phase, event) {
        // ============================================================
        // User input
        // ============================================================

        // Idle + UserText -> Sending
        (Phase::Idle, Event::UserText { text }) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(TransitionError::EmptyInput);
            }

            let mut next = state.clone();
            let mut reset = None;
            if is_greeting(text) {
                reset = Some(Effect::ContextReset {
                    previous_anchor: next.anchor_id.take(),
                });
                next.last_menu_options = Arc::from(Vec::new());
            }

            let request = OutboundRequest {
                message: text.to_string(),
                anchor_id: next.anchor_id.clone(),
                last_options: Arc::clone(&next.last_menu_options),
            };
            next.phase = Phase::Sending;

            let mut result = TransitionResult::new(next);
            if let Some(effect) = reset {
                result = result.with_effect(effect);
            }
            Ok(result
                .with_effect(Effect::user_turn(text))
                .with_effect(Effect::SendRequest(request)))
        }

        // Sending + UserText -> reject
        (Phase::Sending, Event::UserText { .. }) => Err(TransitionError::Busy),

        // ============================================================
        // Replies
        // ============================================================

        // Sending + success -> Idle, context merged
        (Phase::Sending, Event::ReplyReceived { reply: ConversationReply::Success(content) }) => {
            let mut next = state.clone();
            next.phase = Phase::Idle;
            next.anchor_id = content.anchor.apply(state.anchor_id.as_deref());
            // Sticky context: an empty list never clears the previous menu
            if !content.options.is_empty() {
                next.last_menu_options = Arc::clone(&content.options);
            }

            Ok(TransitionResult::new(next)
                .with_effect(Effect::bot_turn(content.text, content.options)))
        }

        // Sending + failure -> Idle, context preserved
        (Phase::Sending, Event::ReplyReceived { reply: ConversationReply::Failure(failure) }) => {
            let mut next = state.clone();
            next.phase = Phase::Idle;

            Ok(TransitionResult::new(next).with_effect(Effect::error_turn(&failure)))
        }

        (Phase::Idle, Event::ReplyReceived { .. }) => Err(TransitionError::InvalidTransition(
            "reply received with no request in flight".to_string(),
        )),
    }
}
