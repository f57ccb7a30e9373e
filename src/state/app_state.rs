//! Application state shared across handlers

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;

use crate::auth::AuthService;
use crate::config::Config;
use crate::db::Database;
use crate::ratelimit::RateLimiter;
use crate::users::UserService;

/// Rate-limit knobs resolved from configuration once at startup.
#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    /// OTP requests allowed per phone per window
    pub otp_max: u32,
    pub otp_window: Duration,
    /// Requests allowed per client IP per window
    pub global_max: u32,
    pub global_window: Duration,
}

impl RateLimitSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            otp_max: config.otp_rate_limit_max,
            otp_window: Duration::from_secs(config.otp_rate_limit_window_seconds),
            global_max: config.global_rate_limit_max,
            global_window: Duration::from_secs(config.global_rate_limit_window_seconds),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub limiter: RateLimiter,
    pub settings: RateLimitSettings,
    pub db: Database,
}

impl AppState {
    pub fn new(
        auth_service: Arc<AuthService>,
        user_service: Arc<UserService>,
        limiter: RateLimiter,
        settings: RateLimitSettings,
        db: Database,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            limiter,
            settings,
            db,
        }
    }
}

// The bearer-token extractor pulls the auth service out on its own; the
// other services are reached through the full state.
impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}
