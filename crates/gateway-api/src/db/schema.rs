//! Diesel table definitions mirroring the migration in `migrations/`.
//!
//! `name_search` is a generated column (never written from Rust); it is
//! declared here read-only by omission from the `Insertable`/`AsChangeset`
//! structs in [`super::models`] even though diesel's `table!` macro still
//! needs to know it exists for `Queryable` derives that select `*`.

diesel::table! {
    items (id) {
        id -> Text,
        source -> Text,
        source_id -> Text,
        #[sql_name = "type"]
        item_type -> Text,
        subtype -> Nullable<Text>,
        name -> Text,
        name_original -> Nullable<Text>,
        name_search -> Text,
        year -> Nullable<Integer>,
        authors -> Array<Text>,
        publisher -> Nullable<Text>,
        genres -> Array<Text>,
        language -> Nullable<Text>,
        tome -> Nullable<Integer>,
        series_name -> Nullable<Text>,
        series_id -> Nullable<Text>,
        piece_count -> Nullable<Integer>,
        figure_count -> Nullable<Integer>,
        theme -> Nullable<Text>,
        runtime -> Nullable<Integer>,
        pages -> Nullable<Integer>,
        isbn -> Nullable<Text>,
        ean -> Nullable<Text>,
        imdb_id -> Nullable<Text>,
        image_url -> Nullable<Text>,
        thumbnail_url -> Nullable<Text>,
        source_url -> Nullable<Text>,
        detail_url -> Nullable<Text>,
        data -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        expires_at -> Nullable<Timestamptz>,
        last_accessed -> Nullable<Timestamptz>,
        fetch_count -> Integer,
    }
}

diesel::table! {
    searches (query, provider, search_type) {
        query -> Text,
        search_term -> Text,
        search_term_normalized -> Text,
        provider -> Text,
        search_type -> Text,
        result_ids -> Array<Text>,
        result_count -> Integer,
        total_results -> Nullable<Integer>,
        cached_results -> Jsonb,
        expires_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    stats (date, source) {
        date -> Date,
        source -> Text,
        api_calls -> Integer,
        cache_hits -> Integer,
        cache_misses -> Integer,
        new_items -> Integer,
        searches -> Integer,
        avg_api_time_ms -> Double,
    }
}
