//! The denormalizer (component B).
//!
//! `project` is the single place permitted to reach into an opaque provider
//! payload by field path. Every other component treats `data` as a black
//! box and only ever reads the typed columns this function produces.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Typed projection of an opaque item payload, stored as columns so the
/// storage layer can index and filter on them without touching `data`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Projection {
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
}

/// Project a payload of a given catalog `type` into typed columns.
///
/// Unknown or non-object payloads project to all-`None`/empty fields;
/// callers (the item cache, `saveItem`) refuse to persist such a result.
pub fn project(item_type: &str, payload: &Value) -> Projection {
    let Some(obj) = payload.as_object() else {
        return Projection::default();
    };

    let mut p = Projection {
        year: year_of(obj),
        genres: string_array(obj, "genres"),
        language: string_field(obj, "language"),
        image_url: image_field(obj, &["cover", "image"]),
        thumbnail_url: image_field(obj, &["thumbnail"]),
        source_url: string_field(obj, "url").or_else(|| nested_string(obj, "urls", "official")),
        ..Projection::default()
    };

    match item_type {
        "book" => {
            p.authors = string_array(obj, "authors");
            p.publisher = string_field(obj, "publisher");
            p.tome = int_field(obj, "tome");
            p.series_name = string_field(obj, "seriesName").or_else(|| string_field(obj, "series_name"));
            p.series_id = string_field(obj, "seriesId").or_else(|| string_field(obj, "series_id"));
            p.pages = int_field(obj, "pages");
            p.isbn = string_field(obj, "isbn");
        }
        "construct_toy" => {
            p.theme = string_field(obj, "theme");
            p.piece_count = int_field(obj, "pieceCount").or_else(|| int_field(obj, "piece_count"));
            p.figure_count = int_field(obj, "figureCount").or_else(|| int_field(obj, "figure_count"));
            p.ean = string_field(obj, "ean");
        }
        "movie" | "tv" => {
            p.runtime = int_field(obj, "runtime");
            p.imdb_id = nested_string(obj, "externalIds", "imdb");
        }
        "game" | "manga" | "album" | "collectible" | "boardgame" => {
            // common fields above already cover these types
        }
        _ => {}
    }

    p
}

fn year_of(obj: &serde_json::Map<String, Value>) -> Option<i32> {
    if let Some(y) = int_field(obj, "year") {
        return Some(y);
    }
    if let Some(y) = int_field(obj, "releaseYear") {
        return Some(y);
    }
    if let Some(date) = string_field(obj, "releaseDate") {
        return date.get(0..4).and_then(|s| s.parse().ok());
    }
    None
}

fn string_field(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

fn int_field(obj: &serde_json::Map<String, Value>, key: &str) -> Option<i32> {
    obj.get(key).and_then(|v| v.as_i64()).map(|n| n as i32)
}

fn string_array(obj: &serde_json::Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn nested_string(obj: &serde_json::Map<String, Value>, parent: &str, key: &str) -> Option<String> {
    obj.get(parent)
        .and_then(|v| v.as_object())
        .and_then(|nested| nested.get(key))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn image_field(obj: &serde_json::Map<String, Value>, candidates: &[&str]) -> Option<String> {
    let images = obj.get("images").and_then(|v| v.as_object());
    for key in candidates {
        if let Some(images) = images {
            if let Some(s) = images.get(*key).and_then(|v| v.as_str()) {
                return Some(s.to_string());
            }
        }
        if let Some(s) = obj.get(*key).and_then(|v| v.as_str()) {
            return Some(s.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_type_projects_to_defaults() {
        let p = project("unknown_type", &json!({"name": "thing"}));
        assert_eq!(p, Projection::default());
    }

    #[test]
    fn non_object_payload_projects_to_defaults() {
        let p = project("book", &Value::Null);
        assert_eq!(p, Projection::default());
    }

    #[test]
    fn book_projection_extracts_authors_and_isbn() {
        let payload = json!({
            "authors": ["Antoine de Saint-Exupéry"],
            "publisher": "Gallimard",
            "pages": 96,
            "isbn": "9780156012195",
            "year": 1943,
            "images": {"cover": "http://example.com/cover.jpg"}
        });
        let p = project("book", &payload);
        assert_eq!(p.authors, vec!["Antoine de Saint-Exupéry".to_string()]);
        assert_eq!(p.publisher.as_deref(), Some("Gallimard"));
        assert_eq!(p.pages, Some(96));
        assert_eq!(p.isbn.as_deref(), Some("9780156012195"));
        assert_eq!(p.year, Some(1943));
        assert_eq!(p.image_url.as_deref(), Some("http://example.com/cover.jpg"));
    }

    #[test]
    fn year_falls_back_to_release_date_prefix() {
        let payload = json!({"releaseDate": "1999-03-31"});
        let p = project("movie", &payload);
        assert_eq!(p.year, Some(1999));
    }

    #[test]
    fn construct_toy_projection_extracts_piece_and_figure_counts() {
        let payload = json!({
            "theme": "Star Wars",
            "pieceCount": 1254,
            "figureCount": 4,
            "ean": "5702015869535"
        });
        let p = project("construct_toy", &payload);
        assert_eq!(p.theme.as_deref(), Some("Star Wars"));
        assert_eq!(p.piece_count, Some(1254));
        assert_eq!(p.figure_count, Some(4));
        assert_eq!(p.ean.as_deref(), Some("5702015869535"));
    }

    #[test]
    fn movie_projection_extracts_runtime_and_imdb_id() {
        let payload = json!({
            "runtime": 142,
            "externalIds": {"imdb": "tt0111161"}
        });
        let p = project("movie", &payload);
        assert_eq!(p.runtime, Some(142));
        assert_eq!(p.imdb_id.as_deref(), Some("tt0111161"));
    }
}
