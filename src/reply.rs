//! Normalized server replies
//!
//! Everything the backend sends back, well-formed or not, ends up as a
//! [`ConversationReply`]. Nothing past this boundary sees a raw payload.

mod error;
mod normalize;

#[cfg(test)]
mod proptests;

pub use error::{FailureKind, GatewayStatus, ReplyFailure, GENERIC_PROCESSING_FAILURE};
pub use normalize::{
    decode_body, normalize, normalize_health, normalize_menu, summarize_health, ConnectionCheck,
    REPLY_TEXT_FIELDS,
};

use crate::backend::{MenuContext, MenuOptions};
use chrono::{DateTime, Utc};

/// How a reply moves the session's position in the menu hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnchorUpdate {
    /// Field absent: keep the current anchor
    #[default]
    Unchanged,
    /// Field explicitly null: back to the root
    Root,
    /// Field present with an id
    At(String),
}

impl AnchorUpdate {
    /// Anchor after applying this update to `current`
    pub fn apply(&self, current: Option<&str>) -> Option<String> {
        match self {
            AnchorUpdate::Unchanged => current.map(String::from),
            AnchorUpdate::Root => None,
            AnchorUpdate::At(id) => Some(id.clone()),
        }
    }
}

/// Content of a successful turn
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyContent {
    /// Never empty
    pub text: String,
    /// In the order received; possibly empty
    pub options: MenuOptions,
    pub anchor: AnchorUpdate,
    pub timestamp: DateTime<Utc>,
    pub menu_context: Option<MenuContext>,
}

/// Normalized result of one server turn
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationReply {
    Success(ReplyContent),
    Failure(ReplyFailure),
}

impl ConversationReply {
    pub fn is_ok(&self) -> bool {
        matches!(self, ConversationReply::Success(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ConversationReply::Success(content) => Some(&content.text),
            ConversationReply::Failure(_) => None,
        }
    }

    pub fn options(&self) -> &[crate::backend::MenuOption] {
        match self {
            ConversationReply::Success(content) => &content.options,
            ConversationReply::Failure(_) => &[],
        }
    }

    pub fn failure(&self) -> Option<&ReplyFailure> {
        match self {
            ConversationReply::Success(_) => None,
            ConversationReply::Failure(failure) => Some(failure),
        }
    }

    /// Diagnostic message of a failed reply
    pub fn error_message(&self) -> Option<&str> {
        self.failure().map(|f| f.detail.as_str())
    }
}
