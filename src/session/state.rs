//! Session state types

use crate::backend::MenuOptions;
use crate::reply::FailureKind;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Whether a turn is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Ready for user input
    #[default]
    Idle,
    /// Request sent, waiting for the reply
    Sending,
}

/// Navigation context carried between turns
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    pub phase: Phase,
    /// Position in the menu hierarchy; `None` is the root
    pub anchor_id: Option<String>,
    /// Options most recently offered by the server
    pub last_menu_options: MenuOptions,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            anchor_id: None,
            last_menu_options: Arc::from(Vec::new()),
        }
    }
}

impl NavigationState {
    pub fn is_busy(&self) -> bool {
        self.phase == Phase::Sending
    }
}

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    User,
    Bot,
}

/// One entry in the transcript
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub id: String,
    pub side: Side,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Options offered with a bot turn; empty otherwise
    pub options: MenuOptions,
    /// Set on bot turns that report a failed request
    pub failure: Option<FailureKind>,
}

impl Turn {
    pub fn new(
        side: Side,
        text: impl Into<String>,
        options: MenuOptions,
        failure: Option<FailureKind>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            side,
            text: text.into(),
            timestamp: Utc::now(),
            options,
            failure,
        }
    }

    pub fn is_user(&self) -> bool {
        self.side == Side::User
    }
}

/// Everything one chat session owns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    pub navigation: NavigationState,
    /// Append-only
    pub transcript: Vec<Turn>,
}
