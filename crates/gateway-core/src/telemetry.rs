//! Process-wide provider telemetry (component J).
//!
//! Counters are incremented synchronously and cheaply (a `RwLock`-guarded
//! map, not atomics-per-field) because exact concurrency ordering doesn't
//! matter here — this tolerates approximate counts. The daily
//! `stats` row is a separate, slower-moving rollup persisted by
//! `gateway_api::api::telemetry`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Running counters for a single provider since process start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderCounters {
    pub requests: u64,
    pub errors: u64,
    pub cached: u64,
    total_api_time_ms: u64,
    api_calls_timed: u64,
}

impl ProviderCounters {
    pub fn avg_api_time_ms(&self) -> f64 {
        if self.api_calls_timed == 0 {
            0.0
        } else {
            self.total_api_time_ms as f64 / self.api_calls_timed as f64
        }
    }
}

/// One row of the `stats` table, a per-day per-provider rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: chrono::NaiveDate,
    pub source: String,
    pub api_calls: i32,
    pub cache_hits: i32,
    pub cache_misses: i32,
    pub new_items: i32,
    pub searches: i32,
    pub avg_api_time_ms: f64,
}

/// Process-wide table of [`ProviderCounters`] keyed by provider tag.
#[derive(Default)]
pub struct Telemetry {
    sources: RwLock<HashMap<String, ProviderCounters>>,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self, source: &str) {
        self.with_mut(source, |c| c.requests += 1);
    }

    pub fn record_error(&self, source: &str) {
        self.with_mut(source, |c| c.errors += 1);
    }

    pub fn record_cache_hit(&self, source: &str) {
        self.with_mut(source, |c| c.cached += 1);
    }

    pub fn record_api_time(&self, source: &str, duration: std::time::Duration) {
        self.with_mut(source, |c| {
            c.total_api_time_ms += duration.as_millis() as u64;
            c.api_calls_timed += 1;
        });
    }

    pub fn snapshot(&self, source: &str) -> ProviderCounters {
        self.sources
            .read()
            .unwrap()
            .get(source)
            .cloned()
            .unwrap_or_default()
    }

    pub fn snapshot_all(&self) -> HashMap<String, ProviderCounters> {
        self.sources.read().unwrap().clone()
    }

    /// Reset every counter. Backs the `DELETE /metrics` endpoint.
    pub fn reset(&self) {
        self.sources.write().unwrap().clear();
    }

    fn with_mut(&self, source: &str, f: impl FnOnce(&mut ProviderCounters)) {
        let mut guard = self.sources.write().unwrap();
        let entry = guard.entry(source.to_string()).or_default();
        f(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_per_source() {
        let telemetry = Telemetry::new();
        telemetry.record_request("googlebooks");
        telemetry.record_request("googlebooks");
        telemetry.record_cache_hit("googlebooks");
        telemetry.record_error("tmdb");

        let books = telemetry.snapshot("googlebooks");
        assert_eq!(books.requests, 2);
        assert_eq!(books.cached, 1);

        let tmdb = telemetry.snapshot("tmdb");
        assert_eq!(tmdb.errors, 1);
        assert_eq!(tmdb.requests, 0);
    }

    #[test]
    fn avg_api_time_is_zero_with_no_samples() {
        let c = ProviderCounters::default();
        assert_eq!(c.avg_api_time_ms(), 0.0);
    }

    #[test]
    fn avg_api_time_averages_recorded_durations() {
        let telemetry = Telemetry::new();
        telemetry.record_api_time("tmdb", std::time::Duration::from_millis(100));
        telemetry.record_api_time("tmdb", std::time::Duration::from_millis(300));
        assert_eq!(telemetry.snapshot("tmdb").avg_api_time_ms(), 200.0);
    }

    #[test]
    fn reset_clears_all_counters() {
        let telemetry = Telemetry::new();
        telemetry.record_request("imdb");
        telemetry.reset();
        assert_eq!(telemetry.snapshot("imdb").requests, 0);
    }
}
