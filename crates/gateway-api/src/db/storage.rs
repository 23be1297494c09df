//! Postgres-backed implementation of `gateway_core::cache::{ItemCacheStore, SearchCacheStore}`
//! (components A, C, D).
//!
//! Every public method swallows its own database errors: a storage failure
//! degrades to a cache miss (`Ok(None)` / `Ok(false)`) rather than
//! propagating into the request path, failure semantics. The
//! one exception is `touch_item`, which is already fire-and-forget and
//! simply logs.

use crate::db::connection_pool::ConnectionPool;
use crate::db::models::{ItemRow, NewItemRow, NewSearchRow, SearchRow};
use crate::db::schema::{items, searches};
use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Float};
use gateway_core::cache::{ItemCacheStore, SaveItemOpts, SearchCacheStore, SearchLookupOpts};
use gateway_core::denormalize::project;
use gateway_core::error::{GatewayError, Result};
use gateway_core::fingerprint::{fingerprint, normalize_text};
use gateway_core::models::{Item, Search};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct PgStorage {
    pool: Arc<ConnectionPool>,
}

impl PgStorage {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Backs the background refresher (component H): up to `limit` rows
    /// from the `items_to_refresh` view, ordered by popularity.
    pub async fn items_to_refresh(&self, limit: usize) -> Result<Vec<Item>> {
        let mut conn = self.pool.get_connection().await?;
        let rows = items::table
            .filter(items::expires_at.le(Utc::now()))
            .order(items::fetch_count.desc())
            .limit(limit as i64)
            .load::<ItemRow>(&mut conn)
            .map_err(GatewayError::from)?;
        Ok(rows.into_iter().map(ItemRow::into_domain).collect())
    }
}

#[async_trait]
impl ItemCacheStore for PgStorage {
    async fn get_item(&self, source: &str, source_id: &str) -> Result<Option<Item>> {
        let id = Item::composite_id(source, source_id);
        let mut conn = match self.pool.get_connection().await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "item cache read failed, treating as miss");
                return Ok(None);
            }
        };

        let row = items::table
            .filter(items::id.eq(&id))
            .first::<ItemRow>(&mut conn)
            .optional();

        match row {
            Ok(Some(row)) => {
                let expired = row
                    .expires_at
                    .map(|exp| exp <= Utc::now())
                    .unwrap_or(false);
                if expired {
                    Ok(None)
                } else {
                    Ok(Some(row.into_domain()))
                }
            }
            Ok(None) => Ok(None),
            Err(e) => {
                tracing::warn!(error = %e, %id, "item cache read failed, treating as miss");
                Ok(None)
            }
        }
    }

    async fn save_item(
        &self,
        source: &str,
        source_id: &str,
        item_type: &str,
        name: &str,
        payload: &Value,
        opts: SaveItemOpts,
    ) -> Result<bool> {
        let projection = project(item_type, payload);
        let ttl = opts.ttl.unwrap_or_else(|| gateway_core::cache::resolve_ttl(source));
        let expires_at = Some(Utc::now() + chrono::Duration::from_std(ttl).unwrap_or_default());

        let new_row = NewItemRow::new(source, source_id, item_type, name, payload, &projection, expires_at);

        let mut conn = match self.pool.get_connection().await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "item cache write failed, dropping write");
                return Ok(false);
            }
        };

        let result = diesel::insert_into(items::table)
            .values(&new_row)
            .on_conflict(items::id)
            .do_update()
            .set(&new_row)
            .execute(&mut conn);

        match result {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(error = %e, source, source_id, "item cache write failed, dropping write");
                Ok(false)
            }
        }
    }

    async fn touch_item(&self, source: &str, source_id: &str) {
        let id = Item::composite_id(source, source_id);
        let Ok(mut conn) = self.pool.get_connection().await else {
            return;
        };
        let result = diesel::update(items::table.filter(items::id.eq(&id)))
            .set((
                items::fetch_count.eq(items::fetch_count + 1),
                items::last_accessed.eq(Utc::now()),
            ))
            .execute(&mut conn);
        if let Err(e) = result {
            tracing::debug!(error = %e, %id, "touch_item failed, ignoring");
        }
    }
}

#[async_trait]
impl SearchCacheStore for PgStorage {
    async fn get_cached_search(
        &self,
        provider: &str,
        search_type: &str,
        query: &str,
        params: &BTreeMap<String, String>,
        opts: SearchLookupOpts,
    ) -> Result<Option<Search>> {
        let key = fingerprint(query, params);

        let mut conn = match self.pool.get_connection().await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "search cache read failed, treating as miss");
                return Ok(None);
            }
        };

        let exact = searches::table
            .filter(searches::query.eq(&key))
            .filter(searches::provider.eq(provider))
            .filter(searches::search_type.eq(search_type))
            .first::<SearchRow>(&mut conn)
            .optional();

        match exact {
            Ok(Some(row)) => {
                let expired = row.expires_at.map(|exp| exp <= Utc::now()).unwrap_or(false);
                return Ok(if expired { None } else { Some(row.into_domain()) });
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "search cache exact-match read failed, treating as miss");
                return Ok(None);
            }
        }

        if opts.exact_match {
            return Ok(None);
        }

        let normalized = normalize_text(query);
        let fuzzy = searches::table
            .filter(searches::provider.eq(provider))
            .filter(searches::search_type.eq(search_type))
            .filter(
                sql::<Bool>("search_term_normalized % ")
                    .bind::<diesel::sql_types::Text, _>(&normalized),
            )
            .order(
                sql::<Float>("similarity(search_term_normalized, ")
                    .bind::<diesel::sql_types::Text, _>(&normalized)
                    .sql(")")
                    .desc(),
            )
            .first::<SearchRow>(&mut conn)
            .optional();

        match fuzzy {
            Ok(Some(row)) if row.expires_at.map(|exp| exp > Utc::now()).unwrap_or(true) => {
                Ok(Some(row.into_domain()))
            }
            Ok(_) => Ok(None),
            Err(e) => {
                tracing::warn!(error = %e, "search cache fuzzy read failed, treating as miss");
                Ok(None)
            }
        }
    }

    async fn save_search_results(
        &self,
        provider: &str,
        search_type: &str,
        query: &str,
        params: &BTreeMap<String, String>,
        envelope: &Value,
        result_ids: Vec<String>,
    ) -> Result<bool> {
        let key = fingerprint(query, params);
        let normalized = normalize_text(query);
        let expires_at = Some(Utc::now() + chrono::Duration::hours(6));

        let new_row = NewSearchRow {
            query: key,
            search_term: query.to_string(),
            search_term_normalized: normalized,
            provider: provider.to_string(),
            search_type: search_type.to_string(),
            result_count: result_ids.len() as i32,
            result_ids,
            total_results: envelope.get("total").and_then(|v| v.as_i64()).map(|n| n as i32),
            cached_results: envelope.clone(),
            expires_at,
        };

        let mut conn = match self.pool.get_connection().await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "search cache write failed, dropping write");
                return Ok(false);
            }
        };

        let result = diesel::insert_into(searches::table)
            .values(&new_row)
            .on_conflict((searches::query, searches::provider, searches::search_type))
            .do_update()
            .set(&new_row)
            .execute(&mut conn);

        match result {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(error = %e, provider, "search cache write failed, dropping write");
                Ok(false)
            }
        }
    }
}

/// Upsert today's rollup row for `source` (component J), read back by
/// `GET /stats`. Kept outside the trait pair since it is not part of the
/// generic cache contract — only the telemetry endpoint calls it.
pub async fn upsert_daily_stats(
    pool: &ConnectionPool,
    stats: &gateway_core::telemetry::DailyStats,
) -> Result<()> {
    use crate::db::schema::stats;

    let mut conn = pool.get_connection().await?;
    diesel::insert_into(stats::table)
        .values((
            stats::date.eq(stats.date),
            stats::source.eq(&stats.source),
            stats::api_calls.eq(stats.api_calls),
            stats::cache_hits.eq(stats.cache_hits),
            stats::cache_misses.eq(stats.cache_misses),
            stats::new_items.eq(stats.new_items),
            stats::searches.eq(stats.searches),
            stats::avg_api_time_ms.eq(stats.avg_api_time_ms),
        ))
        .on_conflict((stats::date, stats::source))
        .do_update()
        .set((
            stats::api_calls.eq(stats.api_calls),
            stats::cache_hits.eq(stats.cache_hits),
            stats::cache_misses.eq(stats.cache_misses),
            stats::new_items.eq(stats.new_items),
            stats::searches.eq(stats.searches),
            stats::avg_api_time_ms.eq(stats.avg_api_time_ms),
        ))
        .execute(&mut conn)
        .map_err(GatewayError::from)?;
    Ok(())
}

/// Today's totals across every provider, for the telemetry read endpoint
///. Returns zeros if no `stats` rows exist yet for today.
pub async fn today_stats_totals(pool: &ConnectionPool) -> Result<DailyTotals> {
    use crate::db::schema::stats;

    let mut conn = pool.get_connection().await?;
    let today = Utc::now().date_naive();
    let rows: Vec<(i32, i32, i32, i32, i32)> = stats::table
        .filter(stats::date.eq(today))
        .select((stats::api_calls, stats::cache_hits, stats::cache_misses, stats::new_items, stats::searches))
        .load(&mut conn)
        .map_err(GatewayError::from)?;

    let mut totals = DailyTotals::default();
    for (api_calls, cache_hits, cache_misses, new_items, searches) in rows {
        totals.api_calls += api_calls;
        totals.cache_hits += cache_hits;
        totals.cache_misses += cache_misses;
        totals.new_items += new_items;
        totals.searches += searches;
    }
    Ok(totals)
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct DailyTotals {
    pub api_calls: i32,
    pub cache_hits: i32,
    pub cache_misses: i32,
    pub new_items: i32,
    pub searches: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_key_used_for_exact_lookup_is_deterministic() {
        let params = BTreeMap::new();
        assert_eq!(fingerprint("dune", &params), fingerprint("dune", &params));
    }
}
