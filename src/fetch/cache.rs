//! In-memory response cache keyed by request URL
//!
//! Entries carry an expiry deadline; an expired entry is treated as absent
//! and evicted on lookup, so callers never see stale bodies.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// A cached response body
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Response body
    pub body: String,

    /// Deadline after which the entry must be refetched
    expires_at: Instant,
}

/// URL-keyed cache with per-entry expiry
pub struct ResponseCache {
    entries: HashMap<String, CacheEntry>,
    expiry: Duration,
}

impl ResponseCache {
    /// Creates a cache whose entries live for `expiry`
    pub fn new(expiry: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            expiry,
        }
    }

    /// Returns the live entry for `url`, evicting it first if expired
    pub fn get(&mut self, url: &str) -> Option<&CacheEntry> {
        if let Some(entry) = self.entries.get(url) {
            if entry.expires_at <= Instant::now() {
                self.entries.remove(url);
                return None;
            }
        }
        self.entries.get(url)
    }

    /// Stores a successful response body for `url`
    pub fn insert(&mut self, url: &str, body: String) {
        self.entries.insert(
            url.to_string(),
            CacheEntry {
                body,
                expires_at: Instant::now() + self.expiry,
            },
        );
    }
}
