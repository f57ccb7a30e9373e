//! Fixed-window rate limiting for Dialtone
//!
//! One primitive serves every throttle in the service: the per-phone OTP
//! issuance limit and the per-IP global limit both call [`RateLimiter::allow`]
//! with their own scope key.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{rate_limit_key, CacheStore};

/// Fixed-window request counter over the cache store.
///
/// Windows are discrete, not sliding: the first request of a window creates
/// the counter and sets its expiry, and every later request only increments.
/// Setting the expiry on that 0→1 transition alone is what stops a steady
/// stream of requests from renewing the window forever.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn CacheStore>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Record a hit against `scope` and report whether it may proceed.
    ///
    /// The hit that brings the count to exactly `max_requests` is the last
    /// one allowed in the window. If the store is unreachable the limiter
    /// fails open: a cache outage already stops OTPs from being stored, so
    /// refusing all traffic on top of that would only add a second failure
    /// mode. The outage is logged either way.
    pub async fn allow(&self, scope: &str, max_requests: u32, window: Duration) -> bool {
        let key = rate_limit_key(scope);

        let count = match self.store.increment(&key).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(scope = %scope, error = %e, "rate limit store unavailable, failing open");
                return true;
            }
        };

        if count == 1 {
            // First hit of a fresh window owns the window boundary.
            if let Err(e) = self.store.set_expiry(&key, window).await {
                tracing::warn!(scope = %scope, error = %e, "failed to set rate limit window expiry");
            }
        }

        count <= i64::from(max_requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheError, MemoryStore};
    use async_trait::async_trait;

    /// Store whose every call fails, standing in for an unreachable Redis.
    struct DownStore;

    #[async_trait]
    impl CacheStore for DownStore {
        async fn set(&self, _: &str, _: &str, _: Duration) -> Result<(), CacheError> {
            Err(CacheError::Store("connection refused".to_string()))
        }
        async fn get(&self, _: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Store("connection refused".to_string()))
        }
        async fn delete(&self, _: &str) -> Result<(), CacheError> {
            Err(CacheError::Store("connection refused".to_string()))
        }
        async fn increment(&self, _: &str) -> Result<i64, CacheError> {
            Err(CacheError::Store("connection refused".to_string()))
        }
        async fn set_expiry(&self, _: &str, _: Duration) -> Result<(), CacheError> {
            Err(CacheError::Store("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_request_hitting_max_is_allowed_then_denied() {
        let limiter = RateLimiter::new(Arc::new(MemoryStore::new()));
        let window = Duration::from_secs(600);

        assert!(limiter.allow("otp-request:+14155552671", 3, window).await);
        assert!(limiter.allow("otp-request:+14155552671", 3, window).await);
        assert!(limiter.allow("otp-request:+14155552671", 3, window).await);
        assert!(!limiter.allow("otp-request:+14155552671", 3, window).await);
        assert!(!limiter.allow("otp-request:+14155552671", 3, window).await);
    }

    #[tokio::test]
    async fn test_scopes_count_independently() {
        let limiter = RateLimiter::new(Arc::new(MemoryStore::new()));
        let window = Duration::from_secs(600);

        for _ in 0..3 {
            assert!(limiter.allow("otp-request:+14155550001", 3, window).await);
        }
        assert!(!limiter.allow("otp-request:+14155550001", 3, window).await);

        // A different phone is untouched by the exhausted counter.
        assert!(limiter.allow("otp-request:+14155550002", 3, window).await);
    }

    #[tokio::test]
    async fn test_window_expiry_resets_count() {
        let limiter = RateLimiter::new(Arc::new(MemoryStore::new()));
        let window = Duration::from_millis(20);

        assert!(limiter.allow("scope", 1, window).await);
        assert!(!limiter.allow("scope", 1, window).await);

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(limiter.allow("scope", 1, window).await);
    }

    #[tokio::test]
    async fn test_denied_requests_do_not_extend_the_window() {
        let limiter = RateLimiter::new(Arc::new(MemoryStore::new()));
        let window = Duration::from_millis(50);

        // First hit opens the window; a second lands inside it and is
        // denied.
        assert!(limiter.allow("scope", 1, window).await);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!limiter.allow("scope", 1, window).await);

        // Only the opening hit owns the boundary. Had the denied hit
        // renewed it, the window would now stretch to the 80ms mark and
        // this request would still be denied.
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(limiter.allow("scope", 1, window).await);
    }

    #[tokio::test]
    async fn test_store_outage_fails_open() {
        let limiter = RateLimiter::new(Arc::new(DownStore));

        for _ in 0..10 {
            assert!(limiter.allow("scope", 1, Duration::from_secs(60)).await);
        }
    }
}
