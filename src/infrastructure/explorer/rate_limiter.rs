use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Token bucket rate limiter for explorer requests
///
/// Capacity equals the refill rate, so a full second's worth of requests
/// may burst before throttling starts.
#[derive(Clone)]
pub struct TokenBucketRateLimiter {
    /// Current number of available tokens
    tokens: Arc<Mutex<f64>>,
    capacity: f64,
    /// Tokens added per second
    refill_rate: f64,
    last_refill: Arc<Mutex<Instant>>,
}

impl TokenBucketRateLimiter {
    /// Create a new rate limiter. Non-positive rates are clamped to a
    /// small positive value; configuration validation rejects them first.
    pub fn new(requests_per_second: f64) -> Self {
        let rate = if requests_per_second > 0.0 {
            requests_per_second
        } else {
            0.1
        };

        Self {
            tokens: Arc::new(Mutex::new(rate)),
            capacity: rate,
            refill_rate: rate,
            last_refill: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Wait for a token and consume it.
    pub async fn acquire(&self) {
        loop {
            let mut tokens = self.tokens.lock().await;
            let mut last_refill = self.last_refill.lock().await;

            let now = Instant::now();
            let elapsed = now.duration_since(*last_refill).as_secs_f64();
            let new_tokens = (*tokens + elapsed * self.refill_rate).min(self.capacity);

            if new_tokens >= 1.0 {
                *tokens = new_tokens - 1.0;
                *last_refill = now;
                break;
            }

            let tokens_needed = 1.0 - new_tokens;
            let wait_duration = Duration::from_secs_f64((tokens_needed / self.refill_rate).max(0.01));

            // Release locks before sleeping
            drop(tokens);
            drop(last_refill);

            sleep(wait_duration).await;
        }
    }

    /// Current number of available tokens (for testing)
    #[cfg(test)]
    pub async fn available_tokens(&self) -> f64 {
        let tokens = self.tokens.lock().await;
        let last_refill = self.last_refill.lock().await;

        let elapsed = Instant::now().duration_since(*last_refill).as_secs_f64();
        (*tokens + elapsed * self.refill_rate).min(self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter_allows_initial_burst() {
        let rate_limiter = TokenBucketRateLimiter::new(5.0);

        let start = Instant::now();
        for _ in 0..5 {
            rate_limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
        assert!(rate_limiter.available_tokens().await < 1.0);
    }

    #[tokio::test]
    async fn test_rate_limiter_enforces_delay() {
        let rate_limiter = TokenBucketRateLimiter::new(2.0);

        rate_limiter.acquire().await;
        rate_limiter.acquire().await;

        let start = Instant::now();
        rate_limiter.acquire().await;
        let elapsed = start.elapsed();

        assert!(
            elapsed >= Duration::from_millis(400),
            "Expected delay >= 400ms, got {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn test_non_positive_rate_is_clamped() {
        let rate_limiter = TokenBucketRateLimiter::new(0.0);
        assert!(rate_limiter.available_tokens().await > 0.0);
    }
}
