//! Authentication service
//!
//! Core business logic for phone-number OTP login. Per phone the protocol
//! walks NoActiveOTP → OTPPending → (Consumed | Expired): requesting a code
//! (re)enters OTPPending by overwriting whatever was stored before, and a
//! successful verification consumes the code and issues a session token.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::cache::{otp_key, CacheError, CacheStore};
use crate::models::User;
use crate::repository::{RepositoryError, UserRepository};

use super::jwt::{mint_token, JwtError};
use super::otp::{generate_numeric_otp, OtpError, OTP_LENGTH};
use super::phone::is_valid_phone;

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    /// One variant for wrong, absent, and expired codes. Keeping them
    /// indistinguishable stops callers from probing whether a phone ever
    /// requested a code.
    #[error("invalid or expired OTP")]
    InvalidOrExpiredOtp,

    #[error("cache store error: {0}")]
    Store(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("token error: {0}")]
    Token(String),

    #[error("otp generation failed: {0}")]
    OtpGeneration(String),
}

impl From<CacheError> for AuthError {
    fn from(e: CacheError) -> Self {
        AuthError::Store(e.to_string())
    }
}

impl From<RepositoryError> for AuthError {
    fn from(e: RepositoryError) -> Self {
        AuthError::Database(e.to_string())
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        AuthError::Token(e.to_string())
    }
}

impl From<OtpError> for AuthError {
    fn from(e: OtpError) -> Self {
        AuthError::OtpGeneration(e.to_string())
    }
}

/// Phone OTP authentication service
pub struct AuthService {
    cache: Arc<dyn CacheStore>,
    users: Arc<dyn UserRepository>,
    jwt_secret: String,
    otp_ttl: Duration,
    token_ttl_hours: i64,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        cache: Arc<dyn CacheStore>,
        users: Arc<dyn UserRepository>,
        jwt_secret: String,
        otp_ttl: Duration,
        token_ttl_hours: i64,
    ) -> Self {
        Self {
            cache,
            users,
            jwt_secret,
            otp_ttl,
            token_ttl_hours,
        }
    }

    /// Signing secret, exposed for the bearer-token extractor.
    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Generate and store a one-time code for `phone`.
    ///
    /// Overwrites any pending code for the phone, so at most one code is
    /// live per phone at any time. Returns the code to the caller, which
    /// owns delivery.
    pub async fn request_otp(&self, phone: &str) -> Result<String, AuthError> {
        let phone = phone.trim();
        if !is_valid_phone(phone) {
            return Err(AuthError::InvalidPhone(
                "phone must be E.164, e.g. +14155552671".to_string(),
            ));
        }

        let code = generate_numeric_otp(OTP_LENGTH)?;
        self.cache.set(&otp_key(phone), &code, self.otp_ttl).await?;

        Ok(code)
    }

    /// Validate a submitted code and, on success, issue a session token for
    /// the (possibly just created) user behind the phone number.
    pub async fn verify_otp(&self, phone: &str, code: &str) -> Result<(String, User), AuthError> {
        let phone = phone.trim();
        let key = otp_key(phone);

        let stored = match self.cache.get(&key).await? {
            Some(stored) => stored,
            None => return Err(AuthError::InvalidOrExpiredOtp),
        };

        // Exact string match, case-sensitive, no normalization.
        if stored != code {
            return Err(AuthError::InvalidOrExpiredOtp);
        }

        // Single use: drop the code before issuing a session. A failed
        // delete must not cost a legitimate login, but it leaves the code
        // replayable until its TTL runs out, so it is logged loudly.
        if let Err(e) = self.cache.delete(&key).await {
            tracing::error!(
                phone = %phone,
                error = %e,
                "failed to delete consumed OTP; code stays valid until TTL expiry"
            );
        }

        let user = self.get_or_create_user(phone).await?;
        let token = mint_token(&user, &self.jwt_secret, self.token_ttl_hours)?;

        Ok((token, user))
    }

    /// Resolve the user for `phone`, creating one on first login.
    ///
    /// Exactly one of {found, created} happens per call. Concurrent first
    /// logins race on the insert; the loser of that race hits the unique
    /// constraint and reads back the winner's row.
    async fn get_or_create_user(&self, phone: &str) -> Result<User, AuthError> {
        if let Some(user) = self.users.get_by_phone(phone).await? {
            return Ok(user);
        }

        match self.users.create(phone).await {
            Ok(user) => Ok(user),
            Err(RepositoryError::DuplicatePhone) => self
                .users
                .get_by_phone(phone)
                .await?
                .ok_or_else(|| {
                    AuthError::Database("user missing after duplicate-phone insert".to_string())
                }),
            Err(e) => Err(e.into()),
        }
    }
}
