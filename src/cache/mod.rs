//! Ephemeral key-value storage for Dialtone
//!
//! Backs both OTP codes and rate-limit counters. All data here is
//! TTL-bound; nothing survives its window.
//!
//! ## Key patterns
//!
//! ```text
//! otp:{phone}                        → pending OTP code (expires with the OTP TTL)
//! rate_limit:otp-request:{phone}     → per-phone OTP issuance counter
//! rate_limit:ip:{client_ip}          → per-IP request counter
//! ```

mod memory;
mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Cache store errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache store error: {0}")]
    Store(String),
}

/// Key-value store with per-key expiry and an atomic counter.
///
/// `increment` must be atomic across concurrent callers sharing a key; the
/// rate limiter's correctness rests on it. No cross-key transactions are
/// offered or needed.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store `value` under `key`, replacing any prior value and expiry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Fetch the live value under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Atomically add one to the integer under `key`, creating it at 1 if
    /// absent, and return the new count. Fails if the existing value is
    /// not an integer.
    async fn increment(&self, key: &str) -> Result<i64, CacheError>;

    /// Set the expiry of an existing key without touching its value.
    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// Cache key for the pending OTP of a phone number.
pub fn otp_key(phone: &str) -> String {
    format!("otp:{}", phone)
}

/// Cache key for a rate-limit counter scope.
pub fn rate_limit_key(scope: &str) -> String {
    format!("rate_limit:{}", scope)
}
