//! TMDB (movies/TV): a plain JSON REST API requiring an API key, subject
//! to the 7-day TTL group and 350ms-class pacing of similar media APIs.

use crate::fetch::HttpFetcher;
use async_trait::async_trait;
use gateway_core::error::{GatewayError, Result};
use gateway_core::provider::{FetchOpts, ProviderClient, ProviderSearchResult, SearchOpts};
use serde_json::Value;
use std::sync::Arc;

pub struct TmdbProvider {
    fetcher: Arc<HttpFetcher>,
    api_key: String,
}

impl TmdbProvider {
    pub fn new(fetcher: Arc<HttpFetcher>, api_key: String) -> Self {
        Self { fetcher, api_key }
    }
}

#[async_trait]
impl ProviderClient for TmdbProvider {
    fn tag(&self) -> &str {
        "tmdb"
    }

    async fn search(&self, query: &str, opts: &SearchOpts) -> Result<ProviderSearchResult> {
        let lang = opts.lang.as_deref().unwrap_or("en-US");
        let page = opts.page.unwrap_or(1);
        let url = format!(
            "https://api.themoviedb.org/3/search/movie?api_key={}&query={}&language={}&page={}",
            self.api_key, query, lang, page
        );

        let response = self.fetcher.get_json(self.tag(), &url).await?;
        let Some(body) = response else {
            return Ok(ProviderSearchResult::empty());
        };

        let total = body.get("total_results").and_then(|v| v.as_u64());
        let results = body
            .get("results")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        Ok(ProviderSearchResult { results, total, page: Some(page) })
    }

    async fn get_details(&self, id: &str, opts: &FetchOpts) -> Result<Option<Value>> {
        let lang = opts.lang.as_deref().unwrap_or("en-US");
        let url = format!(
            "https://api.themoviedb.org/3/movie/{id}?api_key={}&language={lang}&append_to_response=external_ids",
            self.api_key
        );

        match self.fetcher.get_json(self.tag(), &url).await {
            Ok(value) => Ok(value),
            Err(GatewayError::Validation { .. }) => Err(GatewayError::UpstreamNotFound {
                provider: self.tag().to_string(),
                id: id.to_string(),
            }),
            Err(other) => Err(other),
        }
    }
}
