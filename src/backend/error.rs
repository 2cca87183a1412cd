//! Transport error types

use thiserror::Error;

/// Failure to obtain a response body from the backend
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unreachable, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn setup(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Setup, message)
    }

    /// Classify a reqwest error raised before a full body was read
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(format!("Request timeout: {err}"))
        } else if err.is_connect() {
            Self::unreachable(format!("Connection failed: {err}"))
        } else if err.is_builder() {
            Self::setup(format!("Invalid request: {err}"))
        } else {
            Self::unreachable(format!("Request failed: {err}"))
        }
    }
}

/// Why no response was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection refused, DNS failure, connection reset
    Unreachable,
    /// Deadline elapsed before a response arrived
    Timeout,
    /// The request could not be built (bad base URL, client construction)
    Setup,
}
