//! Fixed-window rate limiter
//!
//! Bounds the caller to N calls per window of duration T. All waiting is a
//! blocking sleep on the calling task; the crawl engine is a single logical
//! worker, so no cross-task synchronization is needed.

use std::time::Duration;
use tokio::time::Instant;

/// Limits calls to a fixed quota per time window
pub struct RateLimiter {
    calls: u32,
    period: Duration,
    window_start: Instant,
    count: u32,
}

impl RateLimiter {
    /// Creates a limiter allowing `calls` calls per `period`
    pub fn new(calls: u32, period: Duration) -> Self {
        Self {
            calls,
            period,
            window_start: Instant::now(),
            count: 0,
        }
    }

    /// Blocks until one more call fits within the quota
    ///
    /// Resets the window counter when the window has elapsed; when the quota
    /// is exhausted, sleeps out the remainder of the window and starts a
    /// fresh one.
    pub async fn acquire(&mut self) {
        let now = Instant::now();

        if now.duration_since(self.window_start) >= self.period {
            self.window_start = now;
            self.count = 0;
        }

        if self.count >= self.calls {
            let wait = self.period - now.duration_since(self.window_start);
            tracing::debug!(
                "Rate limit of {} calls per {:?} reached, sleeping {:?}",
                self.calls,
                self.period,
                wait
            );
            tokio::time::sleep(wait).await;
            self.window_start = Instant::now();
            self.count = 0;
        }

        self.count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_under_quota_does_not_wait() {
        let mut limiter = RateLimiter::new(5, Duration::from_secs(60));
        let start = Instant::now();

        for _ in 0..5 {
            limiter.acquire().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_over_quota_waits_out_window() {
        let mut limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        // Third call must wait for the window to elapse
        limiter.acquire().await;

        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets_after_period() {
        let mut limiter = RateLimiter::new(1, Duration::from_secs(10));

        limiter.acquire().await;
        tokio::time::sleep(Duration::from_secs(11)).await;

        let start = Instant::now();
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
