//! The three provider-facing routes: `search`, `details`, `code`.
//!
//! Each handler is the same four-step pipeline: validate params, resolve
//! the provider from the registry, run it through the matching shell
//! wrapper, and build the envelope with cache headers from `ctx.info`.

use crate::api::envelope::{ApiError, DetailEnvelope, SearchEnvelope};
use crate::api::validation::{
    validate_code_params, validate_details_params, validate_search_params, CodeParams, DetailsParams, SearchParams,
};
use crate::db::storage::PgStorage;
use crate::shell::{with_item_cache, with_search_cache, ItemCacheSpec, SearchCacheSpec, ShellContext};
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use gateway_core::cache::SearchLookupOpts;
use gateway_core::config::CacheMode;
use gateway_core::error::GatewayError;
use gateway_core::models::CacheCallInfo;
use gateway_core::provider::{FetchOpts, SearchOpts};
use gateway_core::registry::ProviderRegistry;
use gateway_core::telemetry::Telemetry;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A provider search without an explicit `max` falls back to this.
const DEFAULT_PROVIDER_MAX: u32 = 40;

fn build_ctx(storage: Arc<PgStorage>, telemetry: Arc<Telemetry>, cache_mode: CacheMode) -> ShellContext {
    ShellContext::new(storage.clone(), storage, telemetry, cache_mode)
}

/// Stash `info` into the request's extensions so `RequestTelemetryMiddleware`
/// can read it back after the handler returns and set the `X-Cache*` headers.
fn stash_cache_info(req: &HttpRequest, info: CacheCallInfo) {
    req.extensions_mut().insert(info);
}

pub async fn search(
    req: HttpRequest,
    path: web::Path<String>,
    params: web::Query<SearchParams>,
    registry: web::Data<Arc<ProviderRegistry>>,
    storage: web::Data<Arc<PgStorage>>,
    telemetry: web::Data<Arc<Telemetry>>,
    cache_mode: web::Data<CacheMode>,
) -> Result<HttpResponse, ApiError> {
    let provider_tag = path.into_inner();
    let client = registry.client(&provider_tag)?;
    let validated = validate_search_params(&params, DEFAULT_PROVIDER_MAX)?;

    let mut ctx = build_ctx(storage.get_ref().clone(), telemetry.get_ref().clone(), *cache_mode.get_ref());

    let mut search_params = BTreeMap::new();
    search_params.insert("max".to_string(), validated.max.to_string());
    search_params.insert("page".to_string(), validated.page.to_string());
    if let Some(lang) = &validated.lang {
        search_params.insert("lang".to_string(), lang.clone());
    }

    let search_opts = SearchOpts {
        lang: validated.lang.clone(),
        max: Some(validated.max),
        page: Some(validated.page),
        auto_trad: validated.auto_trad,
    };
    let fetch_client = client.clone();
    let fetch_query = validated.query.clone();

    let envelope = with_search_cache(
        &mut ctx,
        SearchCacheSpec {
            source: &provider_tag,
            search_type: "search",
            query: &validated.query,
            params: search_params,
            cache_results: true,
            lookup_opts: SearchLookupOpts::default(),
            fetch: move || async move {
                let raw = fetch_client.search(&fetch_query, &search_opts).await?;
                Ok(json!({ "results": raw.results, "total": raw.total, "page": raw.page }))
            },
            normalize: |v| v,
        },
    )
    .await?;

    let data = envelope.get("results").and_then(|v| v.as_array()).cloned().unwrap_or_default();
    let total = envelope.get("total").and_then(|v| v.as_u64());

    let body = SearchEnvelope {
        success: true,
        provider: provider_tag,
        query: validated.query,
        total,
        count: data.len(),
        data,
        pagination: Some(json!({ "page": validated.page, "max": validated.max })),
        meta: json!({ "lang": validated.lang, "autoTrad": validated.auto_trad }),
        cache_match: ctx.info.cache_match.clone(),
    };

    stash_cache_info(&req, ctx.info.clone());
    Ok(HttpResponse::Ok().json(body))
}

pub async fn details(
    req: HttpRequest,
    path: web::Path<String>,
    params: web::Query<DetailsParams>,
    registry: web::Data<Arc<ProviderRegistry>>,
    storage: web::Data<Arc<PgStorage>>,
    telemetry: web::Data<Arc<Telemetry>>,
    cache_mode: web::Data<CacheMode>,
) -> Result<HttpResponse, ApiError> {
    let provider_tag = path.into_inner();
    let client = registry.client(&provider_tag)?;

    let detail_url = params.detail_url.as_deref().unwrap_or_default();
    let parsed = validate_details_params(detail_url)?;
    if parsed.provider != provider_tag {
        return Err(GatewayError::Validation {
            message: format!("detailUrl provider '{}' does not match route provider '{}'", parsed.provider, provider_tag),
        }
        .into());
    }

    let fetch_opts = FetchOpts {
        lang: params.lang.clone(),
        auto_trad: params.auto_trad,
        force_refresh: params.refresh,
    };

    let mut ctx = build_ctx(storage.get_ref().clone(), telemetry.get_ref().clone(), *cache_mode.get_ref());
    let item_type = parsed.item_type.clone().unwrap_or_else(|| "item".to_string());
    let fetch_client = client.clone();
    let fetch_id = parsed.id.clone();
    let fetch_opts_owned = fetch_opts.clone();

    let result = with_item_cache(
        &mut ctx,
        ItemCacheSpec {
            source: &provider_tag,
            item_type: &item_type,
            external_id: &parsed.id,
            name_hint: &parsed.id,
            force_refresh: fetch_opts.force_refresh,
            fetch: move || async move { fetch_client.get_details(&fetch_id, &fetch_opts_owned).await },
            normalize: |v| v,
        },
    )
    .await?;

    let Some(data) = result else {
        return Err(GatewayError::UpstreamNotFound { provider: provider_tag, id: parsed.id }.into());
    };

    let body = DetailEnvelope {
        success: true,
        provider: provider_tag,
        id: parsed.id,
        data,
        meta: json!({ "lang": fetch_opts.lang, "autoTrad": fetch_opts.auto_trad }),
    };

    stash_cache_info(&req, ctx.info.clone());
    Ok(HttpResponse::Ok().json(body))
}

pub async fn code(
    req: HttpRequest,
    path: web::Path<String>,
    params: web::Query<CodeParams>,
    registry: web::Data<Arc<ProviderRegistry>>,
    storage: web::Data<Arc<PgStorage>>,
    telemetry: web::Data<Arc<Telemetry>>,
    cache_mode: web::Data<CacheMode>,
) -> Result<HttpResponse, ApiError> {
    let provider_tag = path.into_inner();
    let client = registry.client(&provider_tag)?;
    let code = validate_code_params(params.code.as_deref().unwrap_or_default())?;

    let fetch_opts = FetchOpts {
        lang: params.lang.clone(),
        auto_trad: false,
        force_refresh: false,
    };

    let mut ctx = build_ctx(storage.get_ref().clone(), telemetry.get_ref().clone(), *cache_mode.get_ref());
    let fetch_client = client.clone();
    let fetch_code = code.clone();
    let fetch_opts_owned = fetch_opts.clone();

    let result = with_item_cache(
        &mut ctx,
        ItemCacheSpec {
            source: &provider_tag,
            item_type: "item",
            external_id: &code,
            name_hint: &code,
            force_refresh: false,
            fetch: move || async move { fetch_client.search_by_barcode(&fetch_code, &fetch_opts_owned).await },
            normalize: |v| v,
        },
    )
    .await?;

    let Some(data) = result else {
        return Err(GatewayError::UpstreamNotFound { provider: provider_tag, id: code }.into());
    };

    let body = DetailEnvelope {
        success: true,
        provider: provider_tag,
        id: code,
        data,
        meta: json!({ "lang": fetch_opts.lang }),
    };

    stash_cache_info(&req, ctx.info.clone());
    Ok(HttpResponse::Ok().json(body))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/{provider}/search").route(web::get().to(search)));
    cfg.service(web::resource("/{provider}/details").route(web::get().to(details)));
    cfg.service(web::resource("/{provider}/code").route(web::get().to(code)));
}
