//! The provider capability contract.
//!
//! Every upstream collectibles metadata source implements [`ProviderClient`].
//! The gateway never matches on a provider's name outside the registry
//! (see [`crate::registry`]) — handlers hold a `&dyn ProviderClient` looked
//! up by tag and call its capability methods uniformly.

use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters accepted by a search call, already validated by the HTTP layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchOpts {
    pub lang: Option<String>,
    pub max: Option<u32>,
    pub page: Option<u32>,
    pub auto_trad: bool,
}

/// Parameters accepted by a detail/barcode call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchOpts {
    pub lang: Option<String>,
    pub auto_trad: bool,
    pub force_refresh: bool,
}

/// Raw result of a provider search, before denormalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSearchResult {
    pub results: Vec<Value>,
    pub total: Option<u64>,
    pub page: Option<u32>,
}

impl ProviderSearchResult {
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            total: Some(0),
            page: None,
        }
    }
}

/// Broad shape of how a provider is reached, used to pick defaults for
/// timeouts and whether the anti-bot proxy session is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// A JSON REST API, possibly requiring an API key.
    Json,
    /// An HTML page fetched through the anti-bot proxy session.
    Scraping,
}

/// Capability contract every upstream provider implements.
///
/// `search_by_barcode` and `search_by_author` are optional per provider;
/// the default implementations return [`GatewayError::Validation`] so a
/// caller that routes to an unsupported capability gets a clear 400
/// rather than a silent empty result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Stable tag used as the `source` column value and in routing (e.g. `"googlebooks"`).
    fn tag(&self) -> &str;

    async fn search(&self, query: &str, opts: &SearchOpts) -> Result<ProviderSearchResult>;

    async fn get_details(&self, id: &str, opts: &FetchOpts) -> Result<Option<Value>>;

    async fn search_by_barcode(&self, _code: &str, _opts: &FetchOpts) -> Result<Option<Value>> {
        Err(GatewayError::Validation {
            message: format!("{} does not support barcode lookup", self.tag()),
        })
    }

    async fn search_by_author(&self, _author: &str, _opts: &SearchOpts) -> Result<ProviderSearchResult> {
        Err(GatewayError::Validation {
            message: format!("{} does not support author search", self.tag()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_search_result_empty_has_zero_total() {
        let r = ProviderSearchResult::empty();
        assert_eq!(r.total, Some(0));
        assert!(r.results.is_empty());
    }
}
