//! The provider shell (component E): the two generic cache/fetch/normalize
//! wrappers every route handler calls through instead of talking to a
//! provider or the storage layer directly.
//!
//! Each call site supplies a closure for its provider-specific behavior
//! (fetch, normalize) while the surrounding control flow, cache check,
//! write-back, and telemetry stays centralized and provider-agnostic.

use gateway_core::cache::{ItemCacheStore, SaveItemOpts, SearchCacheStore, SearchLookupOpts};
use gateway_core::config::CacheMode;
use gateway_core::error::{GatewayError, Result};
use gateway_core::models::{CacheCallInfo, CacheSource};
use gateway_core::telemetry::Telemetry;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Request-scoped dependencies the shell needs, assembled once per
/// request in the handler and dropped at the end of it.
pub struct ShellContext {
    pub item_cache: Arc<dyn ItemCacheStore>,
    pub search_cache: Arc<dyn SearchCacheStore>,
    pub telemetry: Arc<Telemetry>,
    pub cache_mode: CacheMode,
    pub info: CacheCallInfo,
}

impl ShellContext {
    pub fn new(
        item_cache: Arc<dyn ItemCacheStore>,
        search_cache: Arc<dyn SearchCacheStore>,
        telemetry: Arc<Telemetry>,
        cache_mode: CacheMode,
    ) -> Self {
        Self {
            item_cache,
            search_cache,
            telemetry,
            cache_mode,
            info: CacheCallInfo::default(),
        }
    }
}

/// Parameters to [`with_item_cache`].
pub struct ItemCacheSpec<'a, F, N, Fut>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<Value>>>,
    N: Fn(Value) -> Value,
{
    pub source: &'a str,
    pub item_type: &'a str,
    pub external_id: &'a str,
    pub name_hint: &'a str,
    pub force_refresh: bool,
    pub fetch: F,
    pub normalize: N,
}

/// Component E's item wrapper.
pub async fn with_item_cache<F, N, Fut>(
    ctx: &mut ShellContext,
    spec: ItemCacheSpec<'_, F, N, Fut>,
) -> Result<Option<Value>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<Value>>>,
    N: Fn(Value) -> Value,
{
    ctx.info = CacheCallInfo::default();
    let start = Instant::now();

    match ctx.cache_mode {
        CacheMode::ApiOnly => {
            let result = run_fetch(ctx, spec.source, spec.fetch).await?;
            ctx.info.record(CacheSource::ApiOnly, start.elapsed());
            return Ok(result.map(spec.normalize));
        }
        CacheMode::DbOnly => {
            let cached = ctx.item_cache.get_item(spec.source, spec.external_id).await?;
            return match cached {
                Some(item) => {
                    ctx.info.record(CacheSource::DbOnly, start.elapsed());
                    Ok(Some(item.data))
                }
                None => {
                    ctx.info.record(CacheSource::DbOnly, start.elapsed());
                    Ok(None)
                }
            };
        }
        CacheMode::Hybrid => {
            if !spec.force_refresh {
                if let Some(item) = ctx.item_cache.get_item(spec.source, spec.external_id).await? {
                    ctx.item_cache.touch_item(spec.source, spec.external_id).await;
                    ctx.info.record(CacheSource::Cache, start.elapsed());
                    return Ok(Some(item.data));
                }
            }
        }
    }

    let fetched = run_fetch(ctx, spec.source, spec.fetch).await?;
    let Some(raw) = fetched else {
        ctx.info.record(CacheSource::Api, start.elapsed());
        return Ok(None);
    };

    let normalized = (spec.normalize)(raw);

    let name = normalized
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or(spec.name_hint)
        .to_string();

    let item_cache = ctx.item_cache.clone();
    let source = spec.source.to_string();
    let external_id = spec.external_id.to_string();
    let item_type = spec.item_type.to_string();
    let payload = normalized.clone();
    tokio::spawn(async move {
        if let Err(e) = item_cache
            .save_item(&source, &external_id, &item_type, &name, &payload, SaveItemOpts::default())
            .await
        {
            tracing::warn!(error = %e, source, external_id, "save_item failed, continuing");
        }
    });

    ctx.info.record(CacheSource::Api, start.elapsed());
    Ok(Some(normalized))
}

async fn run_fetch<F, Fut>(ctx: &ShellContext, source: &str, fetch: F) -> Result<Option<Value>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<Value>>>,
{
    ctx.telemetry.record_request(source);
    let start = Instant::now();
    let result = fetch().await;
    ctx.telemetry.record_api_time(source, start.elapsed());
    if result.is_err() {
        ctx.telemetry.record_error(source);
    }
    result
}

/// Parameters to [`with_search_cache`].
pub struct SearchCacheSpec<'a, F, N, Fut>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value>>,
    N: Fn(Value) -> Value,
{
    pub source: &'a str,
    pub search_type: &'a str,
    pub query: &'a str,
    pub params: BTreeMap<String, String>,
    pub cache_results: bool,
    pub lookup_opts: SearchLookupOpts,
    pub fetch: F,
    pub normalize: N,
}

/// Component E's search wrapper. Returns the normalized search
/// envelope (already containing a `results` array) plus whether the value
/// was a fuzzy match, via `ctx.info.cache_match`.
pub async fn with_search_cache<F, N, Fut>(
    ctx: &mut ShellContext,
    spec: SearchCacheSpec<'_, F, N, Fut>,
) -> Result<Value>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value>>,
    N: Fn(Value) -> Value,
{
    ctx.info = CacheCallInfo::default();
    let start = Instant::now();

    if !matches!(ctx.cache_mode, CacheMode::ApiOnly) {
        let cached = ctx
            .search_cache
            .get_cached_search(spec.source, spec.search_type, spec.query, &spec.params, spec.lookup_opts.clone())
            .await?;
        if let Some(search) = cached {
            ctx.info.record(CacheSource::SearchCache, start.elapsed());
            return Ok(search.cached_results);
        }
        if matches!(ctx.cache_mode, CacheMode::DbOnly) {
            ctx.info.record(CacheSource::DbOnly, start.elapsed());
            return Ok(Value::Object(Default::default()));
        }
    }

    ctx.telemetry.record_request(spec.source);
    let fetch_start = Instant::now();
    let fetched = (spec.fetch)().await;
    ctx.telemetry.record_api_time(spec.source, fetch_start.elapsed());
    let raw = match fetched {
        Ok(v) => v,
        Err(e) => {
            ctx.telemetry.record_error(spec.source);
            return Err(e);
        }
    };

    let normalized = (spec.normalize)(raw);

    if spec.cache_results {
        let result_ids = extract_result_ids(&normalized);
        let search_cache = ctx.search_cache.clone();
        let source = spec.source.to_string();
        let search_type = spec.search_type.to_string();
        let query = spec.query.to_string();
        let params = spec.params.clone();
        let envelope = normalized.clone();
        tokio::spawn(async move {
            if let Err(e) = search_cache
                .save_search_results(&source, &search_type, &query, &params, &envelope, result_ids)
                .await
            {
                tracing::warn!(error = %e, source, "save_search_results failed, continuing");
            }
        });
    }

    ctx.info.record(CacheSource::Api, start.elapsed());
    Ok(normalized)
}

fn extract_result_ids(envelope: &Value) -> Vec<String> {
    envelope
        .get("results")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|item| {
                    item.get("id")
                        .or_else(|| item.get("external_id"))
                        .or_else(|| item.get("sourceId"))
                        .and_then(|v| v.as_str())
                        .map(|s| s.to_string())
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::testing::mocks::FixtureProvider;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NullItemCache;
    #[async_trait::async_trait]
    impl ItemCacheStore for NullItemCache {
        async fn get_item(&self, _source: &str, _source_id: &str) -> Result<Option<gateway_core::models::Item>> {
            Ok(None)
        }
        async fn save_item(
            &self,
            _source: &str,
            _source_id: &str,
            _item_type: &str,
            _name: &str,
            _payload: &Value,
            _opts: SaveItemOpts,
        ) -> Result<bool> {
            Ok(true)
        }
        async fn touch_item(&self, _source: &str, _source_id: &str) {}
    }

    struct NullSearchCache;
    #[async_trait::async_trait]
    impl SearchCacheStore for NullSearchCache {
        async fn get_cached_search(
            &self,
            _provider: &str,
            _search_type: &str,
            _query: &str,
            _params: &BTreeMap<String, String>,
            _opts: SearchLookupOpts,
        ) -> Result<Option<gateway_core::models::Search>> {
            Ok(None)
        }
        async fn save_search_results(
            &self,
            _provider: &str,
            _search_type: &str,
            _query: &str,
            _params: &BTreeMap<String, String>,
            _envelope: &Value,
            _result_ids: Vec<String>,
        ) -> Result<bool> {
            Ok(true)
        }
    }

    fn test_ctx() -> ShellContext {
        ShellContext::new(
            Arc::new(NullItemCache),
            Arc::new(NullSearchCache),
            Arc::new(Telemetry::new()),
            CacheMode::ApiOnly,
        )
    }

    #[tokio::test]
    async fn api_only_mode_always_calls_fetch_and_records_api_only_source() {
        let _ = FixtureProvider::new("stub");
        let calls = AtomicUsize::new(0);
        let mut ctx = test_ctx();

        let result = with_item_cache(
            &mut ctx,
            ItemCacheSpec {
                source: "stub",
                item_type: "book",
                external_id: "abc",
                name_hint: "Dune",
                force_refresh: false,
                fetch: || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(json!({"name": "Dune"})))
                },
                normalize: |v| v,
            },
        )
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.unwrap()["name"], "Dune");
        assert_eq!(ctx.info.source.unwrap().as_str(), "api_only");
    }

    #[tokio::test]
    async fn fetch_returning_none_does_not_panic_and_yields_none() {
        let mut ctx = test_ctx();
        let result = with_item_cache(
            &mut ctx,
            ItemCacheSpec {
                source: "stub",
                item_type: "book",
                external_id: "missing",
                name_hint: "",
                force_refresh: false,
                fetch: || async { Ok(None) },
                normalize: |v| v,
            },
        )
        .await
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn extract_result_ids_reads_id_external_id_or_source_id() {
        let envelope = json!({"results": [{"id": "a"}, {"external_id": "b"}, {"sourceId": "c"}]});
        assert_eq!(extract_result_ids(&envelope), vec!["a", "b", "c"]);
    }
}
