//! Fixtures for testing without external dependencies.

use crate::error::Result;
use crate::provider::{FetchOpts, ProviderClient, ProviderSearchResult, SearchOpts};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory provider backed by a fixed table of ids/queries to responses,
/// used by integration tests that exercise the shell/storage layer without
/// a network call. Records every call it receives so tests can assert on
/// call counts (e.g. "upstream was not hit on a cache hit").
pub struct FixtureProvider {
    tag: String,
    details: HashMap<String, Value>,
    searches: HashMap<String, ProviderSearchResult>,
    pub calls: Mutex<Vec<String>>,
}

impl FixtureProvider {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            details: HashMap::new(),
            searches: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_detail(mut self, id: impl Into<String>, payload: Value) -> Self {
        self.details.insert(id.into(), payload);
        self
    }

    pub fn with_search(mut self, query: impl Into<String>, result: ProviderSearchResult) -> Self {
        self.searches.insert(query.into(), result);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ProviderClient for FixtureProvider {
    fn tag(&self) -> &str {
        &self.tag
    }

    async fn search(&self, query: &str, _opts: &SearchOpts) -> Result<ProviderSearchResult> {
        self.calls.lock().unwrap().push(format!("search:{query}"));
        Ok(self.searches.get(query).cloned().unwrap_or_else(ProviderSearchResult::empty))
    }

    async fn get_details(&self, id: &str, _opts: &FetchOpts) -> Result<Option<Value>> {
        self.calls.lock().unwrap().push(format!("details:{id}"));
        Ok(self.details.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn fixture_provider_returns_registered_detail() {
        let provider = FixtureProvider::new("stub").with_detail("abc", json!({"name": "Thing"}));
        let result = provider.get_details("abc", &FetchOpts::default()).await.unwrap();
        assert_eq!(result, Some(json!({"name": "Thing"})));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn fixture_provider_returns_empty_result_for_unregistered_query() {
        let provider = FixtureProvider::new("stub");
        let result = provider.search("nope", &SearchOpts::default()).await.unwrap();
        assert!(result.results.is_empty());
    }
}
