//! HTTP implementation of the bot backend

use super::{BotBackend, OutboundRequest, RawResponse, TransportError};
use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;

const PROCESS_PATH: &str = "/api/chat/process";
const MENU_PATH: &str = "/api/chat/menu";
const HEALTH_PATH: &str = "/api/chat/health";

/// reqwest-backed transport
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::setup(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<RawResponse, TransportError> {
        let url = self.endpoint(path);
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        if !final_url.starts_with(&url) {
            tracing::warn!(requested = %url, received = %final_url, "Request was redirected");
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::timeout(format!("Timed out reading response: {e}"))
            } else {
                TransportError::unreachable(format!("Failed to read response: {e}"))
            }
        })?;

        Ok(RawResponse {
            status,
            content_type,
            body,
            url: final_url,
        })
    }
}

#[async_trait]
impl BotBackend for HttpBackend {
    async fn process_message(
        &self,
        request: &OutboundRequest,
    ) -> Result<RawResponse, TransportError> {
        let query = request
            .query_params()
            .map_err(|e| TransportError::setup(format!("Failed to encode menu items: {e}")))?;
        self.get(PROCESS_PATH, &query).await
    }

    async fn fetch_menu(&self) -> Result<RawResponse, TransportError> {
        self.get(MENU_PATH, &[]).await
    }

    async fn health_check(&self) -> Result<RawResponse, TransportError> {
        self.get(HEALTH_PATH, &[]).await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
