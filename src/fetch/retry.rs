//! Retry wrapper with failure classification and jittered backoff
//!
//! Classification per attempt:
//!
//! | Failure          | Action                              |
//! |------------------|-------------------------------------|
//! | HTTP 404         | Permanent, abort retries            |
//! | HTTP 403         | Rate limited, cooldown then retry   |
//! | HTTP other       | Backoff sleep, retry                |
//! | Timeout          | Backoff sleep, retry                |
//! | Transport        | Non-recoverable, abort retries      |
//!
//! The jitter term spreads correlated retries across concurrent crawls of
//! the same remote host.

use crate::fetch::client::CachingFetcher;
use crate::FetchError;
use rand::Rng;
use std::time::Duration;

/// Retry behavior configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum fetch attempts before giving up
    pub max_attempts: u32,

    /// Base delay for exponential backoff
    pub backoff_base: Duration,

    /// Fixed sleep after an HTTP 403 (remote rate limit exceeded)
    pub cooldown: Duration,

    /// Lower bound of the uniform jitter term, in seconds
    pub jitter_min: f64,

    /// Upper bound of the uniform jitter term, in seconds
    pub jitter_max: f64,
}

impl RetryPolicy {
    /// Delay before the attempt following failed attempt `attempt` (0-based)
    ///
    /// `base * 2^attempt + uniform(jitter_min..jitter_max)`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let jitter = rand::rng().random_range(self.jitter_min..=self.jitter_max);
        let base = self.backoff_base.as_secs_f64() * 2f64.powi(attempt as i32);
        Duration::from_secs_f64(base + jitter)
    }
}

/// Fetches `url`, retrying per the policy's classification rules
///
/// Returns `None` when the URL is unavailable - a permanent failure or
/// exhausted attempts. The caller treats that as "page/item unavailable,"
/// never as a fatal error.
pub async fn fetch_with_retry(
    fetcher: &mut CachingFetcher,
    url: &str,
    policy: &RetryPolicy,
) -> Option<String> {
    for attempt in 0..policy.max_attempts {
        match fetcher.fetch(url).await {
            Ok(fetched) => return Some(fetched.body),

            Err(FetchError::Status { code: 404, .. }) => {
                tracing::error!("HTTP 404 for {}, not retrying", url);
                return None;
            }

            Err(FetchError::Status { code: 403, .. }) => {
                tracing::error!("Rate limit exceeded (HTTP 403) for {}", url);
                // Cooldown only when another attempt follows
                if attempt + 1 < policy.max_attempts {
                    tracing::info!("Cooling down for {:?}", policy.cooldown);
                    tokio::time::sleep(policy.cooldown).await;
                }
                continue;
            }

            Err(e @ FetchError::Status { .. }) => {
                tracing::error!("{}", e);
            }

            Err(e @ FetchError::Timeout { .. }) => {
                tracing::warn!("{}: retrying ({}/{})", e, attempt + 1, policy.max_attempts);
            }

            Err(e @ FetchError::Transport { .. }) => {
                tracing::error!("{}, not retrying", e);
                return None;
            }
        }

        if attempt + 1 < policy.max_attempts {
            let delay = policy.backoff_delay(attempt);
            tracing::info!("Retrying {} after {:.2}s", url, delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }
    }

    tracing::error!(
        "Failed to fetch {} after {} attempts",
        url,
        policy.max_attempts
    );
    None
}
