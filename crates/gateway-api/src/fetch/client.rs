//! HTTP fetch client for JSON providers (component F).
//!
//! Handles retries/backoff and the process-wide per-provider request
//! spacing every provider implementation shares, so individual provider
//! clients only need to build the request and parse the response.

use gateway_core::error::{GatewayError, Result};
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = concat!("collectibles-gateway/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client plus per-provider pacing state. One instance is
/// built at startup and handed to every JSON provider as `web::Data`.
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    last_request: Mutex<HashMap<String, Instant>>,
    min_interval: HashMap<String, Duration>,
}

impl HttpFetcher {
    pub fn new(max_retries: u32, min_interval: HashMap<String, Duration>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(GatewayError::from)?;

        Ok(Self {
            client,
            max_retries,
            last_request: Mutex::new(HashMap::new()),
            min_interval,
        })
    }

    /// GET `url`, observing this provider's minimum request spacing,
    /// retrying on network errors and 5xx with linear backoff, and
    /// returning `Ok(None)` for a 404 response (provider miss, not an error).
    pub async fn get_json(&self, source: &str, url: &str) -> Result<Option<serde_json::Value>> {
        self.space_requests(source).await;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let response = self
                .client
                .get(url)
                .header("Accept", "application/json")
                .send()
                .await;

            match response {
                Ok(resp) if resp.status() == StatusCode::NOT_FOUND => return Ok(None),
                Ok(resp) if resp.status() == StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = resp
                        .headers()
                        .get("Retry-After")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok());
                    return Err(GatewayError::RateLimited {
                        provider: source.to_string(),
                        retry_after_secs: retry_after,
                    });
                }
                Ok(resp) if resp.status().is_client_error() => {
                    return Err(GatewayError::Validation {
                        message: format!("{source}: upstream returned {}", resp.status()),
                    });
                }
                Ok(resp) if resp.status().is_server_error() => {
                    if attempt > self.max_retries {
                        return Err(GatewayError::UpstreamUnavailable {
                            provider: source.to_string(),
                            message: format!("upstream returned {} after {attempt} attempts", resp.status()),
                        });
                    }
                    tokio::time::sleep(Duration::from_millis(1000 * attempt as u64)).await;
                }
                Ok(resp) => {
                    let value = resp.json::<serde_json::Value>().await.map_err(GatewayError::from)?;
                    return Ok(Some(value));
                }
                Err(e) => {
                    if attempt > self.max_retries {
                        return Err(GatewayError::from(e));
                    }
                    tokio::time::sleep(Duration::from_millis(1000 * attempt as u64)).await;
                }
            }
        }
    }

    async fn space_requests(&self, source: &str) {
        let Some(min_interval) = self.min_interval.get(source).copied() else {
            return;
        };

        let wait = {
            let mut last = self.last_request.lock().unwrap();
            let now = Instant::now();
            let wait = last
                .get(source)
                .map(|prev| min_interval.saturating_sub(now.duration_since(*prev)))
                .unwrap_or(Duration::ZERO);
            last.insert(source.to_string(), now + wait);
            wait
        };

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_empty_spacing_table() {
        let fetcher = HttpFetcher::new(3, HashMap::new());
        assert!(fetcher.is_ok());
    }
}
