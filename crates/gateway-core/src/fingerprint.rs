//! Query fingerprinting and text normalization (component D).
//!
//! The search cache is keyed by a deterministic fingerprint of a query plus
//! its parameters, and both `items.name_search` and
//! `searches.search_term_normalized` are populated from the same
//! accent-folding/lowercasing normalization so trigram similarity lookups
//! compare like with like.

use serde_json::Value;
use std::collections::BTreeMap;

/// Canonical, order-independent serialization of `{query} ∪ params` used as
/// the search-cache key. Two calls with the same logical parameters but
/// different key insertion order must produce identical fingerprints.
pub fn fingerprint(query: &str, params: &BTreeMap<String, String>) -> String {
    let mut map = BTreeMap::new();
    map.insert("q".to_string(), query.to_string());
    for (k, v) in params {
        map.insert(k.clone(), v.clone());
    }
    // BTreeMap iterates in sorted key order, so this is already canonical.
    let object: serde_json::Map<String, Value> = map
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    Value::Object(object).to_string()
}

/// Normalize a display string into its trigram-comparable form: lowercase,
/// accent-folded, punctuation collapsed to single spaces, trimmed.
pub fn normalize_text(input: &str) -> String {
    let folded: String = input.chars().map(fold_accent).collect();
    let lowered = folded.to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    let mut last_was_space = false;
    for ch in lowered.chars() {
        if ch.is_alphanumeric() {
            out.push(ch);
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    out.trim().to_string()
}

/// Folds the common Latin-1 Supplement accented letters down to their
/// unaccented ASCII equivalent. Covers the accents that actually occur in
/// catalog titles (French, Spanish, German); anything outside this table
/// passes through untouched.
fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'a',
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => 'i',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => 'u',
        'ñ' | 'Ñ' => 'n',
        'ç' | 'Ç' => 'c',
        'ý' | 'ÿ' | 'Ý' => 'y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_regardless_of_param_insertion_order() {
        let mut a = BTreeMap::new();
        a.insert("lang".to_string(), "en".to_string());
        a.insert("max".to_string(), "10".to_string());

        let mut b = BTreeMap::new();
        b.insert("max".to_string(), "10".to_string());
        b.insert("lang".to_string(), "en".to_string());

        assert_eq!(fingerprint("dune", &a), fingerprint("dune", &b));
    }

    #[test]
    fn fingerprint_differs_on_query_change() {
        let params = BTreeMap::new();
        assert_ne!(fingerprint("dune", &params), fingerprint("foundation", &params));
    }

    #[test]
    fn normalize_text_folds_accents_and_lowercases() {
        assert_eq!(normalize_text("Le Petit Prince"), "le petit prince");
        assert_eq!(normalize_text("Déjà-vu!"), "deja vu");
    }

    #[test]
    fn normalize_text_collapses_punctuation_to_single_spaces() {
        assert_eq!(normalize_text("Spider-Man:  Homecoming"), "spider man homecoming");
    }

    #[test]
    fn normalize_text_trims_leading_and_trailing_whitespace() {
        assert_eq!(normalize_text("  hello  "), "hello");
    }
}
