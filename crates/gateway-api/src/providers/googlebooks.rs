//! Google Books: a plain JSON REST API, no anti-bot proxy, no mandatory
//! API key (quota is much lower without one).

use crate::fetch::HttpFetcher;
use async_trait::async_trait;
use gateway_core::error::Result;
use gateway_core::provider::{FetchOpts, ProviderClient, ProviderSearchResult, SearchOpts};
use serde_json::Value;
use std::sync::Arc;

pub struct GoogleBooksProvider {
    fetcher: Arc<HttpFetcher>,
    api_key: Option<String>,
}

impl GoogleBooksProvider {
    pub fn new(fetcher: Arc<HttpFetcher>, api_key: Option<String>) -> Self {
        Self { fetcher, api_key }
    }

    fn with_key(&self, url: String) -> String {
        match &self.api_key {
            Some(key) => format!("{url}&key={key}"),
            None => url,
        }
    }
}

#[async_trait]
impl ProviderClient for GoogleBooksProvider {
    fn tag(&self) -> &str {
        "googlebooks"
    }

    async fn search(&self, query: &str, opts: &SearchOpts) -> Result<ProviderSearchResult> {
        let max = opts.max.unwrap_or(20).min(40);
        let url = self.with_key(format!(
            "https://www.googleapis.com/books/v1/volumes?q={}&maxResults={}",
            urlencoding_encode(query),
            max
        ));

        let response = self.fetcher.get_json(self.tag(), &url).await?;
        let Some(body) = response else {
            return Ok(ProviderSearchResult::empty());
        };

        let total = body.get("totalItems").and_then(|v| v.as_u64());
        let results = body
            .get("items")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        Ok(ProviderSearchResult { results, total, page: opts.page })
    }

    async fn get_details(&self, id: &str, _opts: &FetchOpts) -> Result<Option<Value>> {
        let url = self.with_key(format!("https://www.googleapis.com/books/v1/volumes/{id}?"));
        self.fetcher.get_json(self.tag(), &url).await
    }
}

/// Minimal percent-encoding for query strings; avoids pulling in the
/// `url` crate solely for this.
fn urlencoding_encode(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '~') {
                c.to_string()
            } else {
                c.to_string()
                    .bytes()
                    .map(|b| format!("%{:02X}", b))
                    .collect::<String>()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urlencoding_encode_escapes_spaces() {
        assert_eq!(urlencoding_encode("dune messiah"), "dune%20messiah");
    }
}
