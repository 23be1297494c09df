//! Cache contracts and TTL policy shared by components C and D.
//!
//! `gateway-core` defines the storage contract as traits so the provider
//! shell (component E) and the background refresher (component H) depend
//! only on behavior, not on `diesel`; `gateway_api::db::storage` is the
//! concrete Postgres-backed implementation.

use crate::error::Result;
use crate::models::{Item, Search};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Per-provider item TTL table. Falls back to `DEFAULT_TTL` for any
/// source not listed here.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 24 * 3600);

const NINETY_DAYS: Duration = Duration::from_secs(90 * 24 * 3600);
const THIRTY_DAYS: Duration = Duration::from_secs(30 * 24 * 3600);
const SEVEN_DAYS: Duration = Duration::from_secs(7 * 24 * 3600);
const ONE_DAY: Duration = Duration::from_secs(24 * 3600);
const TEN_MINUTES: Duration = Duration::from_secs(600);

const NINETY_DAY_SOURCES: &[&str] = &["lego", "bedetheque", "playmobil", "mega", "klickypedia"];
const THIRTY_DAY_SOURCES: &[&str] = &[
    "googlebooks",
    "openlibrary",
    "comicvine",
    "mangadex",
    "coleka",
    "luluberlu",
    "transformerland",
    "paninimania",
    "consolevariations",
];
const SEVEN_DAY_SOURCES: &[&str] = &["tmdb", "tvdb", "rawg", "igdb", "jikan", "jeuxvideo", "music"];
const ONE_DAY_SOURCES: &[&str] = &["imdb"];
const TEN_MINUTE_SOURCES: &[&str] = &["amazon"];

/// Resolve the default item TTL for a provider, table. A
/// per-call override (`saveItem`'s `ttl` argument) always wins over this.
pub fn resolve_ttl(source: &str) -> Duration {
    if NINETY_DAY_SOURCES.contains(&source) {
        NINETY_DAYS
    } else if THIRTY_DAY_SOURCES.contains(&source) {
        THIRTY_DAYS
    } else if SEVEN_DAY_SOURCES.contains(&source) {
        SEVEN_DAYS
    } else if ONE_DAY_SOURCES.contains(&source) {
        ONE_DAY
    } else if TEN_MINUTE_SOURCES.contains(&source) {
        TEN_MINUTES
    } else {
        DEFAULT_TTL
    }
}

/// Options accepted by a fuzzy search-cache lookup.
#[derive(Debug, Clone)]
pub struct SearchLookupOpts {
    pub exact_match: bool,
    pub similarity_threshold: f32,
}

impl Default for SearchLookupOpts {
    fn default() -> Self {
        Self {
            exact_match: false,
            similarity_threshold: 0.4,
        }
    }
}

/// Options accepted by `saveItem`.
#[derive(Debug, Clone, Default)]
pub struct SaveItemOpts {
    pub ttl: Option<Duration>,
    pub subtype: Option<String>,
}

/// Storage contract for component C (item cache). Implementations must
/// never propagate a database error to the caller: every method returns
/// `Ok(None)` / `Ok(false)` on internal failure after logging it.
#[async_trait]
pub trait ItemCacheStore: Send + Sync {
    async fn get_item(&self, source: &str, source_id: &str) -> Result<Option<Item>>;

    async fn save_item(
        &self,
        source: &str,
        source_id: &str,
        item_type: &str,
        name: &str,
        payload: &Value,
        opts: SaveItemOpts,
    ) -> Result<bool>;

    /// Fire-and-forget bump of `fetch_count`/`last_accessed` on a cache hit.
    async fn touch_item(&self, source: &str, source_id: &str);
}

/// Storage contract for component D (search cache).
#[async_trait]
pub trait SearchCacheStore: Send + Sync {
    async fn get_cached_search(
        &self,
        provider: &str,
        search_type: &str,
        query: &str,
        params: &BTreeMap<String, String>,
        opts: SearchLookupOpts,
    ) -> Result<Option<Search>>;

    async fn save_search_results(
        &self,
        provider: &str,
        search_type: &str,
        query: &str,
        params: &BTreeMap<String, String>,
        envelope: &Value,
        result_ids: Vec<String>,
    ) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_table_matches_spec_groups() {
        assert_eq!(resolve_ttl("lego"), NINETY_DAYS);
        assert_eq!(resolve_ttl("googlebooks"), THIRTY_DAYS);
        assert_eq!(resolve_ttl("tmdb"), SEVEN_DAYS);
        assert_eq!(resolve_ttl("imdb"), ONE_DAY);
        assert_eq!(resolve_ttl("amazon"), TEN_MINUTES);
        assert_eq!(resolve_ttl("some_unlisted_provider"), DEFAULT_TTL);
    }

    #[test]
    fn default_similarity_threshold_is_zero_point_four() {
        assert_eq!(SearchLookupOpts::default().similarity_threshold, 0.4);
    }
}
