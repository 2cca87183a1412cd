//! Failure taxonomy for normalized replies

use std::fmt;
use thiserror::Error;

/// A classified failure with diagnostic detail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct ReplyFailure {
    pub kind: FailureKind,
    /// Diagnostic detail; never required to render the failure
    pub detail: String,
}

impl ReplyFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::MalformedPayload, detail)
    }

    pub fn missing_field(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::MissingField, detail)
    }

    pub fn server_reported(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::ServerReportedFailure, detail)
    }

    /// Short humanized text shown as the bot's turn
    pub fn user_message(&self) -> String {
        match self.kind {
            FailureKind::NetworkUnreachable => {
                "Sorry, I can't reach the server right now. Please check your connection and try again."
                    .to_string()
            }
            FailureKind::Timeout => {
                "Sorry, the server took too long to respond. Please try again.".to_string()
            }
            FailureKind::BadGateway(GatewayStatus::NotFound) => {
                "Sorry, the chat service could not be found. Please try again later.".to_string()
            }
            FailureKind::BadGateway(GatewayStatus::ServerError(_)) => {
                "Sorry, the server is having trouble right now. Please try again in a moment."
                    .to_string()
            }
            FailureKind::BadGateway(GatewayStatus::Unauthorized | GatewayStatus::Forbidden) => {
                "Sorry, this app is not allowed to use the chat service right now.".to_string()
            }
            FailureKind::BadGateway(GatewayStatus::Other(status)) => {
                format!("Sorry, the server rejected the request (status {status}). Please try again.")
            }
            FailureKind::MalformedPayload => {
                "Sorry, I received an unexpected response from the server. Please try again."
                    .to_string()
            }
            FailureKind::ServerReportedFailure => {
                let detail = self.detail.trim().trim_end_matches('.');
                if detail.is_empty() || detail == GENERIC_PROCESSING_FAILURE {
                    "Sorry, I couldn't process that. Please try again.".to_string()
                } else {
                    format!("Sorry, I couldn't process that: {detail}. Please try again.")
                }
            }
            FailureKind::MissingField => {
                "Sorry, I received an incomplete response from the server. Please try again."
                    .to_string()
            }
        }
    }
}

/// Detail used when the server signals failure without saying why
pub const GENERIC_PROCESSING_FAILURE: &str = "processing failed";

/// Closed classification of everything that can go wrong in one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FailureKind {
    /// No response obtained
    #[error("network unreachable")]
    NetworkUnreachable,
    /// No response within the transport deadline
    #[error("timeout")]
    Timeout,
    /// Non-2xx status
    #[error("bad gateway ({0})")]
    BadGateway(GatewayStatus),
    /// Not JSON, or an HTML page where JSON was expected
    #[error("malformed payload")]
    MalformedPayload,
    /// JSON that explicitly signals failure
    #[error("server reported failure")]
    ServerReportedFailure,
    /// JSON without a recognizable reply-text field
    #[error("missing field")]
    MissingField,
}

impl FailureKind {
    /// Whether resending the same turn may succeed
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::NetworkUnreachable
                | Self::Timeout
                | Self::BadGateway(GatewayStatus::ServerError(_))
        )
    }
}

/// Subdivision of non-2xx statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayStatus {
    /// 404
    NotFound,
    /// 500 and above
    ServerError(u16),
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// Any other non-2xx status
    Other(u16),
}

impl GatewayStatus {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            500.. => Self::ServerError(status),
            _ => Self::Other(status),
        }
    }
}

impl fmt::Display for GatewayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::ServerError(status) => write!(f, "server error {status}"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::Other(status) => write!(f, "status {status}"),
        }
    }
}
