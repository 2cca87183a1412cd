//! Menu bot backend abstraction
//!
//! The transport boundary of the client: raw responses come back unjudged and
//! are classified by [`crate::reply`].

mod error;
mod http;
mod types;

pub use error::{TransportError, TransportErrorKind};
pub use http::HttpBackend;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for reaching the menu bot server
#[async_trait]
pub trait BotBackend: Send + Sync {
    /// Send one chat turn
    async fn process_message(
        &self,
        request: &OutboundRequest,
    ) -> Result<RawResponse, TransportError>;

    /// Fetch the top-level menu
    async fn fetch_menu(&self) -> Result<RawResponse, TransportError>;

    /// Query backend health
    async fn health_check(&self) -> Result<RawResponse, TransportError>;

    /// Base URL requests are sent to
    fn base_url(&self) -> &str;
}

#[async_trait]
impl<T: BotBackend + ?Sized> BotBackend for Arc<T> {
    async fn process_message(
        &self,
        request: &OutboundRequest,
    ) -> Result<RawResponse, TransportError> {
        (**self).process_message(request).await
    }

    async fn fetch_menu(&self) -> Result<RawResponse, TransportError> {
        (**self).fetch_menu().await
    }

    async fn health_check(&self) -> Result<RawResponse, TransportError> {
        (**self).health_check().await
    }

    fn base_url(&self) -> &str {
        (**self).base_url()
    }
}

/// Logging wrapper for backends
pub struct LoggingBackend {
    inner: Arc<dyn BotBackend>,
}

impl LoggingBackend {
    pub fn new(inner: Arc<dyn BotBackend>) -> Self {
        Self { inner }
    }

    fn log_outcome(
        &self,
        operation: &'static str,
        started: std::time::Instant,
        result: &Result<RawResponse, TransportError>,
    ) {
        let duration = started.elapsed();
        match result {
            Ok(raw) => {
                tracing::info!(
                    operation,
                    base_url = %self.inner.base_url(),
                    duration_ms = %duration.as_millis(),
                    status = raw.status,
                    content_type = raw.content_type.as_deref().unwrap_or(""),
                    "Backend request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    operation,
                    base_url = %self.inner.base_url(),
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    error = %e.message,
                    "Backend request failed"
                );
            }
        }
    }
}

#[async_trait]
impl BotBackend for LoggingBackend {
    async fn process_message(
        &self,
        request: &OutboundRequest,
    ) -> Result<RawResponse, TransportError> {
        tracing::debug!(
            message = %request.message,
            anchor_id = ?request.anchor_id,
            previous_options = request.last_options.len(),
            "Sending chat turn"
        );
        let start = std::time::Instant::now();
        let result = self.inner.process_message(request).await;
        self.log_outcome("process_message", start, &result);
        result
    }

    async fn fetch_menu(&self) -> Result<RawResponse, TransportError> {
        let start = std::time::Instant::now();
        let result = self.inner.fetch_menu().await;
        self.log_outcome("fetch_menu", start, &result);
        result
    }

    async fn health_check(&self) -> Result<RawResponse, TransportError> {
        let start = std::time::Instant::now();
        let result = self.inner.health_check().await;
        self.log_outcome("health_check", start, &result);
        result
    }

    fn base_url(&self) -> &str {
        self.inner.base_url()
    }
}
