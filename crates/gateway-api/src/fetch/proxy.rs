//! Anti-bot scraping proxy client (component F), implementing
//! `gateway_core::session::ProxySessionBackend` against the configured
//! `FSR_BASE` endpoint.

use async_trait::async_trait;
use gateway_core::error::{GatewayError, Result};
use gateway_core::session::{ProxySessionBackend, SessionHandle};
use reqwest::Client;
use std::time::Duration;

const SCRAPE_TIMEOUT: Duration = Duration::from_secs(45);

pub struct FsrProxyBackend {
    client: Client,
    base_url: String,
}

impl FsrProxyBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(SCRAPE_TIMEOUT)
            .build()
            .map_err(GatewayError::from)?;
        Ok(Self { client, base_url: base_url.into() })
    }

    /// Fetch `url` through the proxy, tagged with the current session.
    /// A proxy 4xx is fatal for the call; a 5xx surfaces as
    /// [`GatewayError::Session`] so `ScrapingSessionManager::with_session`
    /// rotates and retries once.
    pub async fn fetch_via_proxy(&self, session: &SessionHandle, url: &str) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/fetch", self.base_url))
            .query(&[("session", session.as_str()), ("url", url)])
            .send()
            .await
            .map_err(GatewayError::from)?;

        if response.status().is_server_error() {
            return Err(GatewayError::Session {
                message: format!("proxy returned {}", response.status()),
            });
        }
        if response.status().is_client_error() {
            return Err(GatewayError::UpstreamUnavailable {
                provider: "proxy".to_string(),
                message: format!("proxy rejected request: {}", response.status()),
            });
        }

        response.text().await.map_err(|e| GatewayError::from(e))
    }
}

#[async_trait]
impl ProxySessionBackend for FsrProxyBackend {
    async fn create_session(&self) -> Result<SessionHandle> {
        let response = self
            .client
            .post(format!("{}/session", self.base_url))
            .send()
            .await
            .map_err(GatewayError::from)?;

        if !response.status().is_success() {
            return Err(GatewayError::Session {
                message: format!("session create failed: {}", response.status()),
            });
        }

        #[derive(serde::Deserialize)]
        struct SessionResponse {
            session_id: String,
        }
        let body: SessionResponse = response.json().await.map_err(GatewayError::from)?;
        Ok(body.session_id)
    }

    async fn destroy_session(&self, id: &SessionHandle) -> Result<()> {
        let _ = self
            .client
            .delete(format!("{}/session/{}", self.base_url, id))
            .send()
            .await;
        Ok(())
    }
}
