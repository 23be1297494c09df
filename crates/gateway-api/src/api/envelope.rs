//! Response envelope shapes (component I) and the `GatewayError` →
//! `actix_web::ResponseError` mapping.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use gateway_core::error::GatewayError;
use gateway_core::models::{CacheCallInfo, CacheMatch};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct SearchEnvelope {
    pub success: bool,
    pub provider: String,
    pub query: String,
    pub total: Option<u64>,
    pub count: usize,
    pub data: Vec<Value>,
    pub pagination: Option<Value>,
    pub meta: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_match: Option<CacheMatch>,
}

#[derive(Debug, Serialize)]
pub struct DetailEnvelope {
    pub success: bool,
    pub provider: String,
    pub id: String,
    pub data: Value,
    pub meta: Value,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
}

/// Thin wrapper so `GatewayError` can implement actix's `ResponseError`
/// without `gateway-core` depending on `actix-web`.
#[derive(Debug)]
pub struct ApiError(pub GatewayError);

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        ApiError(e)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            GatewayError::Validation { .. } => StatusCode::BAD_REQUEST,
            GatewayError::UpstreamNotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::Auth { .. } => StatusCode::UNAUTHORIZED,
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::Session { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::Cache { .. } | GatewayError::Serialization { .. } | GatewayError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = ErrorBody {
            success: false,
            error: self.0.to_string(),
            code: self.0.code(),
            hint: None,
            params: Vec::new(),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// `Cache-Control` max-age, in seconds, applied to a successful response
/// given its cache outcome. Search results get a short public cache;
/// detail pages served from our own cache get a longer one.
pub fn cache_control_for(info: &CacheCallInfo) -> String {
    let max_age = if info.hit { 3600 } else { 60 };
    format!("public, max-age={max_age}")
}

pub fn cache_header_value(info: &CacheCallInfo) -> &'static str {
    if info.hit {
        "HIT"
    } else {
        "MISS"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_maps_to_400() {
        let err = ApiError(GatewayError::Validation { message: "bad q".into() });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_not_found_maps_to_404() {
        let err = ApiError(GatewayError::UpstreamNotFound { provider: "tmdb".into(), id: "1".into() });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn cache_hit_gets_longer_max_age() {
        let mut info = CacheCallInfo::default();
        info.record(gateway_core::models::CacheSource::Cache, std::time::Duration::ZERO);
        assert_eq!(cache_control_for(&info), "public, max-age=3600");
        assert_eq!(cache_header_value(&info), "HIT");
    }
}
