//! Request parameter validation (component I).
//!
//! Each validator returns a [`GatewayError::Validation`] carrying a
//! human-readable message; the HTTP layer maps it to 400 uniformly via
//! [`super::envelope::ApiError`].

use gateway_core::error::{GatewayError, Result};

fn invalid(message: impl Into<String>) -> GatewayError {
    GatewayError::Validation { message: message.into() }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub lang: Option<String>,
    pub max: Option<u32>,
    pub page: Option<u32>,
    #[serde(rename = "autoTrad", default)]
    pub auto_trad: bool,
    #[serde(default)]
    pub refresh: bool,
}

pub struct ValidatedSearch {
    pub query: String,
    pub lang: Option<String>,
    pub max: u32,
    pub page: u32,
    pub auto_trad: bool,
    pub refresh: bool,
}

/// `validateSearchParams`: `q` non-empty after trim, `max` clamped
/// into `[1, provider_max]`, `lang` stripped to its primary subtag.
pub fn validate_search_params(params: &SearchParams, provider_max: u32) -> Result<ValidatedSearch> {
    let query = params.q.as_deref().unwrap_or("").trim().to_string();
    if query.is_empty() {
        return Err(invalid("q must be at least 1 character"));
    }

    let max = params.max.unwrap_or(provider_max);
    if max < 1 || max > provider_max {
        return Err(invalid(format!("max must be between 1 and {provider_max}")));
    }

    let lang = params.lang.as_deref().map(normalize_lang);

    Ok(ValidatedSearch {
        query,
        lang,
        max,
        page: params.page.unwrap_or(1).max(1),
        auto_trad: params.auto_trad,
        refresh: params.refresh,
    })
}

/// `en-US` -> `en`.
fn normalize_lang(lang: &str) -> String {
    lang.split(['-', '_']).next().unwrap_or(lang).to_ascii_lowercase()
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DetailsParams {
    #[serde(rename = "detailUrl")]
    pub detail_url: Option<String>,
    pub lang: Option<String>,
    #[serde(rename = "autoTrad", default)]
    pub auto_trad: bool,
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CodeParams {
    pub code: Option<String>,
    pub lang: Option<String>,
}

pub struct DetailRef {
    pub provider: String,
    pub item_type: Option<String>,
    pub id: String,
}

/// `validateDetailsParams`: parse `detailUrl=/P/{type}/{id}` (the
/// type segment is optional for providers with a single catalog type).
pub fn validate_details_params(detail_url: &str) -> Result<DetailRef> {
    let segments: Vec<&str> = detail_url.trim_matches('/').split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [provider, id] => Ok(DetailRef {
            provider: provider.to_string(),
            item_type: None,
            id: id.to_string(),
        }),
        [provider, item_type, id] => Ok(DetailRef {
            provider: provider.to_string(),
            item_type: Some(item_type.to_string()),
            id: id.to_string(),
        }),
        _ => Err(invalid("detailUrl must be of the form /provider/[type/]id")),
    }
}

/// `validateCodeParams`: barcode/ISBN minimum length of 8 digits.
pub fn validate_code_params(code: &str) -> Result<String> {
    let trimmed = code.trim();
    if trimmed.len() < 8 {
        return Err(invalid("code must be at least 8 characters"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_is_rejected() {
        let params = SearchParams { q: Some("   ".into()), lang: None, max: None, page: None, auto_trad: false, refresh: false };
        assert!(validate_search_params(&params, 40).is_err());
    }

    #[test]
    fn max_outside_provider_bound_is_rejected() {
        let params = SearchParams { q: Some("dune".into()), lang: None, max: Some(999), page: None, auto_trad: false, refresh: false };
        assert!(validate_search_params(&params, 40).is_err());
    }

    #[test]
    fn lang_is_stripped_to_primary_subtag() {
        let params = SearchParams { q: Some("dune".into()), lang: Some("en-US".into()), max: None, page: None, auto_trad: false, refresh: false };
        let validated = validate_search_params(&params, 40).unwrap();
        assert_eq!(validated.lang.as_deref(), Some("en"));
    }

    #[test]
    fn detail_url_without_type_segment_parses() {
        let parsed = validate_details_params("/googlebooks/abc123").unwrap();
        assert_eq!(parsed.provider, "googlebooks");
        assert_eq!(parsed.id, "abc123");
        assert!(parsed.item_type.is_none());
    }

    #[test]
    fn detail_url_with_type_segment_parses() {
        let parsed = validate_details_params("/lego/construct_toy/75192").unwrap();
        assert_eq!(parsed.item_type.as_deref(), Some("construct_toy"));
    }

    #[test]
    fn short_code_is_rejected() {
        assert!(validate_code_params("1234").is_err());
    }
}
