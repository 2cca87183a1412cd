//! Session controller
//!
//! Owns one conversation. User input and replies go through [`transition`];
//! the resulting effects are applied here: turns land in the transcript and
//! requests go to the backend.

use super::input::normalize_input;
use super::state::{ConversationState, Turn};
use super::transition::{transition, TransitionError};
use super::{Effect, Event};
use crate::backend::{BotBackend, MenuOption, MenuOptions, OutboundRequest};
use crate::reply::{
    self, summarize_health, ConnectionCheck, ConversationReply, FailureKind, ReplyFailure,
};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Drives one chat session against a backend
pub struct SessionController<B: BotBackend> {
    backend: B,
    state: Mutex<ConversationState>,
}

impl<B: BotBackend> SessionController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: Mutex::new(ConversationState::default()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// True while a turn is in flight
    pub fn is_busy(&self) -> bool {
        lock(&self.state).navigation.is_busy()
    }

    pub fn anchor_id(&self) -> Option<String> {
        lock(&self.state).navigation.anchor_id.clone()
    }

    pub fn last_menu_options(&self) -> MenuOptions {
        lock(&self.state).navigation.last_menu_options.clone()
    }

    pub fn transcript(&self) -> Vec<Turn> {
        lock(&self.state).transcript.clone()
    }

    pub fn snapshot(&self) -> ConversationState {
        lock(&self.state).clone()
    }

    /// Send one user turn and wait for the normalized reply.
    ///
    /// Returns `Err` only when the input is rejected up front (empty, or a
    /// turn already in flight); in that case nothing changes. Server and
    /// network problems come back as [`ConversationReply::Failure`] after
    /// being recorded as a bot turn.
    pub async fn submit_user_text(
        &self,
        input: &str,
    ) -> Result<ConversationReply, TransitionError> {
        let text = normalize_input(input);
        let request = apply_event(&self.state, Event::UserText { text })?.ok_or_else(|| {
            TransitionError::InvalidTransition("user text produced no request".to_string())
        })?;

        let pending = PendingTurn::new(&self.state);
        let reply = reply::normalize(self.backend.process_message(&request).await);
        pending.complete(reply.clone())?;
        Ok(reply)
    }

    /// Select one of the offered options by sending its ordinal
    pub async fn select_option(
        &self,
        option: &MenuOption,
    ) -> Result<ConversationReply, TransitionError> {
        self.submit_user_text(&option.selection_value()).await
    }

    /// Fetch the top-level menu without touching the session
    pub async fn fetch_menu(&self) -> Result<MenuOptions, ReplyFailure> {
        reply::normalize_menu(self.backend.fetch_menu().await)
    }

    /// Probe the backend and summarize the result
    pub async fn test_connection(&self) -> ConnectionCheck {
        summarize_health(self.backend.health_check().await)
    }
}

fn lock(state: &Mutex<ConversationState>) -> MutexGuard<'_, ConversationState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run one event through the state machine and apply its effects.
///
/// Returns the request to send, if the transition produced one.
fn apply_event(
    state: &Mutex<ConversationState>,
    event: Event,
) -> Result<Option<OutboundRequest>, TransitionError> {
    let carries_over = matches!(
        &event,
        Event::ReplyReceived { reply: ConversationReply::Success(content) } if content.options.is_empty()
    );

    let mut guard = lock(state);
    let result = transition(&guard.navigation, event)?;
    guard.navigation = result.new_state;

    if carries_over && !guard.navigation.last_menu_options.is_empty() {
        tracing::debug!(
            anchor_id = ?guard.navigation.anchor_id,
            options = guard.navigation.last_menu_options.len(),
            "Reply had no options, keeping previous menu"
        );
    }

    let mut request = None;
    for effect in result.effects {
        match effect {
            Effect::ContextReset { previous_anchor } => {
                tracing::info!(previous_anchor = ?previous_anchor, "Greeting reset navigation context");
            }
            Effect::AppendTurn {
                side,
                text,
                options,
                failure,
            } => {
                guard.transcript.push(Turn::new(side, text, options, failure));
            }
            Effect::SendRequest(outbound) => request = Some(outbound),
        }
    }
    Ok(request)
}

/// Resolves the in-flight turn if the submitting future is dropped.
///
/// Without this a cancelled submit would leave the session busy forever.
struct PendingTurn<'a> {
    state: &'a Mutex<ConversationState>,
    armed: bool,
}

impl<'a> PendingTurn<'a> {
    fn new(state: &'a Mutex<ConversationState>) -> Self {
        Self { state, armed: true }
    }

    fn complete(mut self, reply: ConversationReply) -> Result<(), TransitionError> {
        self.armed = false;
        apply_event(self.state, Event::ReplyReceived { reply }).map(|_| ())
    }
}

impl Drop for PendingTurn<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!("Turn abandoned before a reply arrived");
        let failure = ReplyFailure::new(
            FailureKind::NetworkUnreachable,
            "turn abandoned before a reply arrived",
        );
        let event = Event::ReplyReceived {
            reply: ConversationReply::Failure(failure),
        };
        if let Err(e) = apply_event(self.state, event) {
            tracing::error!(error = %e, "Failed to resolve abandoned turn");
        }
    }
}
