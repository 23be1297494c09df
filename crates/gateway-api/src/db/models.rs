//! Row types mapping the `items`/`searches` tables to and from
//! [`gateway_core::models::Item`] / [`gateway_core::models::Search`].
//!
//! `gateway-core` never depends on `diesel`, so every read from Postgres
//! passes through [`ItemRow::into_domain`] and every write is built with
//! [`NewItemRow::from_domain`].

use crate::db::schema::{items, searches};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use gateway_core::denormalize::Projection;
use gateway_core::models::{Item, Search};
use serde_json::Value;

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = items, primary_key(id))]
pub struct ItemRow {
    pub id: String,
    pub source: String,
    pub source_id: String,
    pub item_type: String,
    pub subtype: Option<String>,
    pub name: String,
    pub name_original: Option<String>,
    pub name_search: String,
    pub year: Option<i32>,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub genres: Vec<String>,
    pub language: Option<String>,
    pub tome: Option<i32>,
    pub series_name: Option<String>,
    pub series_id: Option<String>,
    pub piece_count: Option<i32>,
    pub figure_count: Option<i32>,
    pub theme: Option<String>,
    pub runtime: Option<i32>,
    pub pages: Option<i32>,
    pub isbn: Option<String>,
    pub ean: Option<String>,
    pub imdb_id: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub source_url: Option<String>,
    pub detail_url: Option<String>,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_accessed: Option<DateTime<Utc>>,
    pub fetch_count: i32,
}

impl ItemRow {
    pub fn into_domain(self) -> Item {
        Item {
            id: self.id,
            source: self.source,
            source_id: self.source_id,
            item_type: self.item_type,
            subtype: self.subtype,
            name: self.name,
            name_original: self.name_original,
            projection: Projection {
                year: self.year,
                authors: self.authors,
                publisher: self.publisher,
                genres: self.genres,
                language: self.language,
                tome: self.tome,
                series_name: self.series_name,
                series_id: self.series_id,
                piece_count: self.piece_count,
                figure_count: self.figure_count,
                theme: self.theme,
                runtime: self.runtime,
                pages: self.pages,
                isbn: self.isbn,
                ean: self.ean,
                imdb_id: self.imdb_id,
                image_url: self.image_url,
                thumbnail_url: self.thumbnail_url,
                source_url: self.source_url,
                detail_url: self.detail_url,
            },
            data: self.data,
            created_at: self.created_at,
            updated_at: self.updated_at,
            expires_at: self.expires_at,
            last_accessed: self.last_accessed,
            fetch_count: self.fetch_count,
        }
    }
}

/// Insertable/upsertable form. `name_search` is intentionally absent: it is
/// a generated column Postgres computes from `name`.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = items)]
pub struct NewItemRow {
    pub id: String,
    pub source: String,
    pub source_id: String,
    pub item_type: String,
    pub subtype: Option<String>,
    pub name: String,
    pub name_original: Option<String>,
    pub year: Option<i32>,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub genres: Vec<String>,
    pub language: Option<String>,
    pub tome: Option<i32>,
    pub series_name: Option<String>,
    pub series_id: Option<String>,
    pub piece_count: Option<i32>,
    pub figure_count: Option<i32>,
    pub theme: Option<String>,
    pub runtime: Option<i32>,
    pub pages: Option<i32>,
    pub isbn: Option<String>,
    pub ean: Option<String>,
    pub imdb_id: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub source_url: Option<String>,
    pub detail_url: Option<String>,
    pub data: Value,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewItemRow {
    pub fn new(
        source: &str,
        source_id: &str,
        item_type: &str,
        name: &str,
        payload: &Value,
        projection: &Projection,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Item::composite_id(source, source_id),
            source: source.to_string(),
            source_id: source_id.to_string(),
            item_type: item_type.to_string(),
            subtype: None,
            name: name.to_string(),
            name_original: None,
            year: projection.year,
            authors: projection.authors.clone(),
            publisher: projection.publisher.clone(),
            genres: projection.genres.clone(),
            language: projection.language.clone(),
            tome: projection.tome,
            series_name: projection.series_name.clone(),
            series_id: projection.series_id.clone(),
            piece_count: projection.piece_count,
            figure_count: projection.figure_count,
            theme: projection.theme.clone(),
            runtime: projection.runtime,
            pages: projection.pages,
            isbn: projection.isbn.clone(),
            ean: projection.ean.clone(),
            imdb_id: projection.imdb_id.clone(),
            image_url: projection.image_url.clone(),
            thumbnail_url: projection.thumbnail_url.clone(),
            source_url: projection.source_url.clone(),
            detail_url: projection.detail_url.clone(),
            data: payload.clone(),
            updated_at: Utc::now(),
            expires_at,
        }
    }
}

#[derive(Debug, Clone, Queryable)]
pub struct SearchRow {
    pub query: String,
    pub search_term: String,
    pub search_term_normalized: String,
    pub provider: String,
    pub search_type: String,
    pub result_ids: Vec<String>,
    pub result_count: i32,
    pub total_results: Option<i32>,
    pub cached_results: Value,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SearchRow {
    pub fn into_domain(self) -> Search {
        Search {
            query_fingerprint: self.query,
            provider: self.provider,
            search_type: self.search_type,
            search_term: self.search_term,
            search_term_normalized: self.search_term_normalized,
            result_ids: self.result_ids,
            result_count: self.result_count,
            total_results: self.total_results,
            cached_results: self.cached_results,
            expires_at: self.expires_at,
        }
    }
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = searches)]
pub struct NewSearchRow {
    pub query: String,
    pub search_term: String,
    pub search_term_normalized: String,
    pub provider: String,
    pub search_type: String,
    pub result_ids: Vec<String>,
    pub result_count: i32,
    pub total_results: Option<i32>,
    pub cached_results: Value,
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_row_derives_composite_id() {
        let row = NewItemRow::new(
            "googlebooks",
            "abc123",
            "book",
            "Dune",
            &serde_json::json!({}),
            &Projection::default(),
            None,
        );
        assert_eq!(row.id, "googlebooks:abc123");
    }
}
