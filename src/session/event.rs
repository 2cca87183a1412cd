//! Events that can occur in a session

use crate::reply::ConversationReply;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    /// User submitted text (already normalized)
    UserText { text: String },

    /// The in-flight request resolved, successfully or not
    ReplyReceived { reply: ConversationReply },
}
