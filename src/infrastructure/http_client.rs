//! HTTP client for upstream lookups with rate limiting and error classification
//!
//! Every request carries the configured client identifier, is bounded by a hard
//! timeout and passes through a shared `governor` limiter. Failures come back as
//! [`FetchError`] values; [`HttpClient::fetch_optional`] turns them into `None`
//! so call sites handle absence uniformly.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{clock::DefaultClock, state::{direct::NotKeyed, InMemoryState}, Quota, RateLimiter};
use reqwest::{header::{HeaderMap, HeaderValue, USER_AGENT}, Client};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::config::{defaults, AppConfig};
use super::fetch_error::{FetchError, FetchResult};

/// HTTP client configuration
#[derive(Debug, Clone, serde::Serialize)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// 0 disables the limiter
    pub max_requests_per_second: u32,
}

impl HttpClientConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout_seconds: config.request_timeout_seconds,
            max_requests_per_second: config.max_requests_per_second,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
        }
    }
}

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate-limited JSON client shared by the feed reader, resolver and score providers
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    rate_limiter: Option<Arc<DirectLimiter>>,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| anyhow::anyhow!("Invalid user agent '{}': {}", config.user_agent, e))?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .gzip(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        let rate_limiter = NonZeroU32::new(config.max_requests_per_second)
            .map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps))));

        Ok(Self {
            client,
            rate_limiter,
            config,
        })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// GET `url` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        self.get_json_with_query(url, &[]).await
    }

    /// GET `url` with extra query parameters and decode the JSON body
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> FetchResult<T> {
        let mut target = Url::parse(url).map_err(|e| FetchError::invalid_url(url, e.to_string()))?;
        if !query.is_empty() {
            target.query_pairs_mut().extend_pairs(query);
        }

        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        debug!("🌐 HTTP GET: {}", target);
        let response = self
            .client
            .get(target.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(target.as_str(), &e, self.config.timeout_seconds))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: target.to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::from_reqwest(target.as_str(), &e, self.config.timeout_seconds))
    }

    /// Like [`get_json`](Self::get_json) but logs failures and reports them as `None`.
    pub async fn fetch_optional<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Option<T> {
        match self.get_json_with_query(url, query).await {
            Ok(value) => Some(value),
            Err(e) if e.is_rate_limited() => {
                warn!("⏳ Rate limited by upstream: {}", e);
                None
            }
            Err(e) => {
                warn!("⚠️ Upstream lookup failed: {}", e);
                None
            }
        }
    }
}

/// Pause between successive upstream calls in a loop, with random jitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPacer {
    delay: Duration,
    jitter_ms: u64,
}

impl RequestPacer {
    pub fn new(delay_ms: u64, jitter_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            jitter_ms,
        }
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(config.request_delay_ms, config.request_jitter_ms)
    }

    /// No pausing at all
    pub fn disabled() -> Self {
        Self::new(0, 0)
    }

    pub fn is_disabled(&self) -> bool {
        self.delay.is_zero() && self.jitter_ms == 0
    }

    pub async fn pause(&self) {
        if self.is_disabled() {
            return;
        }
        let jitter = if self.jitter_ms > 0 {
            Duration::from_millis(fastrand::u64(0..=self.jitter_ms))
        } else {
            Duration::ZERO
        };
        tokio::time::sleep(self.delay + jitter).await;
    }
}
