//! Conversational session
//!
//! Navigation context is a pure state machine; [`SessionController`] applies
//! its effects against a backend.

mod controller;
mod effect;
pub mod event;
pub mod input;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use controller::SessionController;
pub use effect::Effect;
pub use event::Event;
pub use state::{ConversationState, NavigationState, Phase, Side, Turn};
pub use transition::{transition, TransitionError, TransitionResult};
