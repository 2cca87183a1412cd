//! Menu bot client
//!
//! Client-side session controller for a menu-driven chat bot. Keeps the
//! navigation context between turns and normalizes whatever the server sends
//! back into a single reply shape.

pub mod backend;
pub mod config;
pub mod locale;
pub mod menu;
pub mod reply;
pub mod session;
