//! Authentication routes

use axum::{middleware::from_fn_with_state, routing::post, Router};

use crate::handlers::auth;
use crate::middleware::otp_rate_limit;
use crate::state::AppState;

/// Create authentication routes
///
/// The per-phone limiter guards only OTP issuance; verification stays
/// unthrottled here and is covered by the global per-IP limit.
pub fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/auth/request-otp",
            post(auth::request_otp).layer(from_fn_with_state(state, otp_rate_limit)),
        )
        .route("/api/auth/verify-otp", post(auth::verify_otp))
}
