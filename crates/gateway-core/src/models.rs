//! Domain model shared across the storage layer, provider shell, and HTTP
//! envelope. These are plain structs with no `diesel` dependency;
//! `gateway_api::db::schema_models` maps them to and from the `Queryable`/
//! `Insertable` row types that actually touch Postgres.

use crate::denormalize::Projection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A cached upstream payload plus its projected columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// `"{source}:{sourceId}"` — see invariant I2.
    pub id: String,
    pub source: String,
    pub source_id: String,
    pub item_type: String,
    pub subtype: Option<String>,
    pub name: String,
    pub name_original: Option<String>,
    pub projection: Projection,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_accessed: Option<DateTime<Utc>>,
    pub fetch_count: i32,
}

impl Item {
    pub fn composite_id(source: &str, source_id: &str) -> String {
        format!("{source}:{source_id}")
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }
}

/// A cached search-query envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Search {
    pub query_fingerprint: String,
    pub provider: String,
    pub search_type: String,
    pub search_term: String,
    pub search_term_normalized: String,
    pub result_ids: Vec<String>,
    pub result_count: i32,
    pub total_results: Option<i32>,
    pub cached_results: Value,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Annotation attached to a search result served via fuzzy trigram match
/// rather than an exact fingerprint hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMatch {
    #[serde(rename = "type")]
    pub match_type: &'static str,
    pub score: f32,
    pub original_query: String,
    pub searched_query: String,
}

/// Where a response was ultimately served from. Mirrors the `X-Cache-Source`
/// header values the middleware sets on the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheSource {
    Cache,
    SearchCache,
    Api,
    ApiOnly,
    DbOnly,
}

impl CacheSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheSource::Cache => "cache",
            CacheSource::SearchCache => "search_cache",
            CacheSource::Api => "api",
            CacheSource::ApiOnly => "api_only",
            CacheSource::DbOnly => "db_only",
        }
    }

    /// Whether this source counts as a cache hit for `X-Cache`.
    pub fn is_hit(&self) -> bool {
        !matches!(self, CacheSource::Api | CacheSource::ApiOnly)
    }
}

/// Request-scoped cache telemetry threaded through the provider shell.
///
/// Built fresh per request and carried explicitly through `ShellContext`
/// and into the actix request extensions, never shared across requests,
/// so concurrent requests can't clobber each other's cache info.
#[derive(Debug, Clone)]
pub struct CacheCallInfo {
    pub hit: bool,
    pub source: Option<CacheSource>,
    pub duration: std::time::Duration,
    pub cache_match: Option<CacheMatch>,
}

impl Default for CacheCallInfo {
    fn default() -> Self {
        Self {
            hit: false,
            source: None,
            duration: std::time::Duration::ZERO,
            cache_match: None,
        }
    }
}

impl CacheCallInfo {
    pub fn record(&mut self, source: CacheSource, duration: std::time::Duration) {
        self.hit = source.is_hit();
        self.source = Some(source);
        self.duration = duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_id_matches_invariant_i2() {
        assert_eq!(Item::composite_id("googlebooks", "abc123"), "googlebooks:abc123");
    }

    #[test]
    fn cache_source_hit_classification() {
        assert!(CacheSource::Cache.is_hit());
        assert!(CacheSource::SearchCache.is_hit());
        assert!(CacheSource::DbOnly.is_hit());
        assert!(!CacheSource::Api.is_hit());
        assert!(!CacheSource::ApiOnly.is_hit());
    }

    #[test]
    fn cache_call_info_default_is_a_miss() {
        let info = CacheCallInfo::default();
        assert!(!info.hit);
        assert!(info.source.is_none());
    }

    #[test]
    fn recording_a_hit_source_marks_info_as_hit() {
        let mut info = CacheCallInfo::default();
        info.record(CacheSource::Cache, std::time::Duration::from_millis(3));
        assert!(info.hit);
        assert_eq!(info.source.unwrap().as_str(), "cache");
    }
}
