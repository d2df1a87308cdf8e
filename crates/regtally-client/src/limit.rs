//! Minimum-interval request pacing.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::debug;

/// Enforces a minimum interval between consecutive requests.
///
/// The limiter assumes a single sequential caller: every request path
/// holds `&mut self` for the duration of `wait`, so the last-permitted
/// marker observes one timeline.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    /// A limiter allowing `rate` requests per second.
    ///
    /// A zero or negative rate disables pacing entirely.
    pub fn new(rate: f64) -> Self {
        let min_interval = if rate > 0.0 {
            Duration::from_secs_f64(1.0 / rate)
        } else {
            Duration::ZERO
        };
        Self {
            min_interval,
            last_call: None,
        }
    }

    /// Sleep just long enough that this call completes no sooner than
    /// `min_interval` after the previous permitted call. The first call
    /// never sleeps.
    pub async fn wait(&mut self) {
        if self.min_interval.is_zero() {
            return;
        }
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let pause = self.min_interval - elapsed;
                debug!(pause_ms = pause.as_millis() as u64, "rate limiting");
                sleep(pause).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_call_never_sleeps() {
        let mut limiter = RateLimiter::new(2.0);
        let start = Instant::now();
        limiter.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_calls_are_spaced() {
        let mut limiter = RateLimiter::new(2.0);
        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(500));
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn no_sleep_when_interval_already_passed() {
        let mut limiter = RateLimiter::new(2.0);
        limiter.wait().await;
        sleep(Duration::from_secs(3)).await;
        let start = Instant::now();
        limiter.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_rate_disables_pacing() {
        let mut limiter = RateLimiter::new(0.0);
        let start = Instant::now();
        for _ in 0..10 {
            limiter.wait().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
