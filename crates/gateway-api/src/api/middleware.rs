//! Request-id and cache-header injection middleware.
//!
//! A standard `Transform`/`Service` pair: instead of gating requests it
//! stamps every response with `X-Request-ID` and, once the handler has
//! recorded a [`gateway_core::models::CacheCallInfo`] in the request
//! extensions, the `X-Cache*`/`Cache-Control` headers

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;
use gateway_core::models::CacheCallInfo;
use std::future::{ready, Ready};
use std::rc::Rc;
use uuid::Uuid;

use super::envelope::{cache_control_for, cache_header_value};

pub struct RequestTelemetryMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestTelemetryMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTelemetryMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTelemetryMiddlewareService { service: Rc::new(service) }))
    }
}

pub struct RequestTelemetryMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestTelemetryMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        let request_id = req
            .headers()
            .get("X-Request-ID")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let span = tracing::info_span!("request", request_id = %request_id, path = %req.path());
        let _entered = span.clone();

        Box::pin(async move {
            let mut response = tracing::Instrument::instrument(service.call(req), span).await?;

            let headers = response.headers_mut();
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                headers.insert(HeaderName::from_static("x-request-id"), value);
            }

            if let Some(info) = response.request().extensions().get::<CacheCallInfo>() {
                headers.insert(
                    HeaderName::from_static("x-cache"),
                    HeaderValue::from_static(cache_header_value(info)),
                );
                if let Some(source) = info.source {
                    if let Ok(v) = HeaderValue::from_str(source.as_str()) {
                        headers.insert(HeaderName::from_static("x-cache-source"), v);
                    }
                }
                if let Ok(v) = HeaderValue::from_str(&info.duration.as_millis().to_string()) {
                    headers.insert(HeaderName::from_static("x-cache-duration-ms"), v);
                }
                if let Ok(v) = HeaderValue::from_str(&cache_control_for(info)) {
                    headers.insert(HeaderName::from_static("cache-control"), v);
                }
            }

            Ok(response)
        })
    }
}
