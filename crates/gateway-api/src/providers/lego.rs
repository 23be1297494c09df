//! LEGO set catalog: scraped through the anti-bot proxy rather than a
//! public JSON API, so every call goes through the shared
//! `ScrapingSessionManager` instead of `HttpFetcher` directly.

use crate::fetch::FsrProxyBackend;
use async_trait::async_trait;
use gateway_core::error::{GatewayError, Result};
use gateway_core::provider::{FetchOpts, ProviderClient, ProviderSearchResult, SearchOpts};
use gateway_core::session::{ProxySessionBackend, ScrapingSessionManager, SessionHandle};
use serde_json::Value;
use std::sync::Arc;

/// `ProxySessionBackend` for `Arc<FsrProxyBackend>`, so the session
/// manager can own a cheap handle to the same proxy client the provider
/// also uses directly for `fetch_via_proxy`.
#[async_trait]
impl ProxySessionBackend for Arc<FsrProxyBackend> {
    async fn create_session(&self) -> Result<SessionHandle> {
        self.as_ref().create_session().await
    }

    async fn destroy_session(&self, id: &SessionHandle) -> Result<()> {
        self.as_ref().destroy_session(id).await
    }
}

pub struct LegoProvider {
    proxy: Arc<FsrProxyBackend>,
    sessions: ScrapingSessionManager<Arc<FsrProxyBackend>>,
}

impl LegoProvider {
    pub fn new(proxy: Arc<FsrProxyBackend>) -> Self {
        let sessions = ScrapingSessionManager::new(proxy.clone());
        Self { proxy, sessions }
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let proxy = self.proxy.clone();
        let url = url.to_string();
        self.sessions
            .with_session(move |session| {
                let proxy = proxy.clone();
                let url = url.clone();
                async move { proxy.fetch_via_proxy(&session, &url).await }
            })
            .await
    }
}

#[async_trait]
impl ProviderClient for LegoProvider {
    fn tag(&self) -> &str {
        "lego"
    }

    async fn search(&self, query: &str, _opts: &SearchOpts) -> Result<ProviderSearchResult> {
        let url = format!("https://www.lego.com/en-us/search?q={}", query);
        let _html = self.fetch_html(&url).await?;
        // Parsing the search-results page into structured hits is
        // provider-specific HTML scraping, out of scope for this example
        // wiring; `normalize` downstream expects already-structured JSON,
        // so a real implementation would extract it here with `scraper`
        // or similar before returning.
        Ok(ProviderSearchResult::empty())
    }

    async fn get_details(&self, id: &str, _opts: &FetchOpts) -> Result<Option<Value>> {
        let url = format!("https://www.lego.com/en-us/product/{id}");
        match self.fetch_html(&url).await {
            Ok(html) if html.is_empty() => Ok(None),
            Ok(html) => Ok(Some(Value::String(html))),
            Err(GatewayError::UpstreamUnavailable { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
