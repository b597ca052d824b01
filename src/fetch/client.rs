//! Caching HTTP fetcher
//!
//! Wraps a reqwest client with the response cache and rate limiter. A cache
//! hit bypasses the limiter entirely; a miss acquires a rate-limit slot,
//! issues the GET with browser-mimicking headers and the configured timeout,
//! and caches the body on success. Non-2xx responses are never cached.

use crate::fetch::cache::ResponseCache;
use crate::fetch::limiter::RateLimiter;
use crate::{FetchError, FetchResult};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONNECTION, DNT,
    REFERER, UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use reqwest::Client;
use std::time::Duration;

/// Result of a successful fetch
#[derive(Debug, Clone)]
pub struct Fetched {
    /// Response body
    pub body: String,

    /// Whether the body came from the cache rather than the network
    pub from_cache: bool,
}

/// HTTP fetcher with response caching and rate limiting
pub struct CachingFetcher {
    client: Client,
    cache: ResponseCache,
    limiter: RateLimiter,
    headers: HeaderMap,
    timeout: Duration,
}

impl CachingFetcher {
    /// Creates a fetcher that sends browser-mimicking headers
    pub fn new(
        limiter: RateLimiter,
        cache_expiry: Duration,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Self::with_headers(limiter, cache_expiry, timeout, browser_headers())
    }

    /// Creates a fetcher for the GitHub API
    ///
    /// Sends the explicit API-version accept header and, when a token is
    /// configured, a token authorization header.
    pub fn for_github_api(
        limiter: RateLimiter,
        cache_expiry: Duration,
        timeout: Duration,
        token: Option<&str>,
    ) -> Result<Self, reqwest::Error> {
        let mut headers = browser_headers();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        if let Some(token) = token {
            match HeaderValue::from_str(&format!("token {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => {
                    tracing::warn!("GitHub token contains invalid header characters, ignoring");
                }
            }
        }
        Self::with_headers(limiter, cache_expiry, timeout, headers)
    }

    fn with_headers(
        limiter: RateLimiter,
        cache_expiry: Duration,
        timeout: Duration,
        headers: HeaderMap,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            cache: ResponseCache::new(cache_expiry),
            limiter,
            headers,
            timeout,
        })
    }

    /// Fetches `url`, consulting the cache first
    ///
    /// # Returns
    ///
    /// * `Ok(Fetched)` - The body, with `from_cache` reporting its origin
    /// * `Err(FetchError)` - Classified failure (status / timeout / transport)
    pub async fn fetch(&mut self, url: &str) -> FetchResult<Fetched> {
        if let Some(entry) = self.cache.get(url) {
            tracing::debug!("Cache hit: {}", url);
            return Ok(Fetched {
                body: entry.body.clone(),
                from_cache: true,
            });
        }

        self.limiter.acquire().await;

        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                code: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        self.cache.insert(url, body.clone());
        tracing::debug!("Fetched from server: {}", url);

        Ok(Fetched {
            body,
            from_cache: false,
        })
    }
}

/// Maps a reqwest error to the fetch error taxonomy
fn classify_transport_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Returns a header set that mimics a standard browser
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:117.0) Gecko/20100101 Firefox/117.0",
        ),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(REFERER, HeaderValue::from_static("https://pypi.org/"));
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );
    headers
}
