//! Rate-limited, cached, retrying HTTP fetch layer
//!
//! This module contains the pieces of the fetch pipeline:
//! - [`RateLimiter`] bounds outbound request rate to a quota per window
//! - [`ResponseCache`] stores successful response bodies with an expiry
//! - [`CachingFetcher`] ties the two together around a reqwest client
//! - [`fetch_with_retry`] classifies failures and applies backoff

mod cache;
mod client;
mod limiter;
mod retry;

pub use cache::{CacheEntry, ResponseCache};
pub use client::{browser_headers, CachingFetcher, Fetched};
pub use limiter::RateLimiter;
pub use retry::{fetch_with_retry, RetryPolicy};
