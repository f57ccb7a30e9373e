//! Rate limiting middleware
//!
//! Two layers over the same fixed-window limiter: a coarse per-IP gate in
//! front of the whole API, and a tight per-phone gate on OTP issuance.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::models::RequestOtpRequest;
use crate::state::AppState;

/// Upper bound when buffering request bodies; generous for OTP payloads.
const BODY_LIMIT: usize = 16 * 1024;

/// Per-IP limit across all routes.
pub async fn global_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let client = extract_client_ip(&request);
    let scope = format!("ip:{}", client);

    let allowed = state
        .limiter
        .allow(
            &scope,
            state.settings.global_max,
            state.settings.global_window,
        )
        .await;
    if !allowed {
        tracing::warn!(client = %client, "global rate limit exceeded");
        return ApiError::RateLimited.into_response();
    }

    next.run(request).await
}

/// Per-phone limit on OTP issuance.
///
/// Runs in front of the handler, so it reads the phone out of the JSON
/// body itself and reassembles the request afterwards. The raw (trimmed)
/// phone keys the counter; format validation stays in the service, which
/// means malformed numbers still spend budget for their key.
pub async fn otp_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    let bytes = match to_bytes(body, BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return ApiError::InvalidInput("request body unreadable or too large".to_string())
                .into_response()
        }
    };

    let phone = match serde_json::from_slice::<RequestOtpRequest>(&bytes) {
        Ok(req) => req.phone.trim().to_string(),
        Err(_) => {
            return ApiError::InvalidInput("invalid request body".to_string()).into_response()
        }
    };
    if phone.is_empty() {
        return ApiError::InvalidInput("phone is required".to_string()).into_response();
    }

    let scope = format!("otp-request:{}", phone);
    let allowed = state
        .limiter
        .allow(&scope, state.settings.otp_max, state.settings.otp_window)
        .await;
    if !allowed {
        tracing::warn!(phone = %phone, "OTP request rate limit exceeded");
        return ApiError::RateLimited.into_response();
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    next.run(request).await
}

/// Extract client IP from request headers
pub(crate) fn extract_client_ip(request: &Request) -> String {
    // Try X-Forwarded-For first
    if let Some(forwarded) = request.headers().get("x-forwarded-for") {
        if let Ok(s) = forwarded.to_str() {
            if let Some(ip) = s.split(',').next() {
                return ip.trim().to_string();
            }
        }
    }

    // Try X-Real-IP
    if let Some(real_ip) = request.headers().get("x-real-ip") {
        if let Ok(s) = real_ip.to_str() {
            return s.to_string();
        }
    }

    // Fallback to a default
    "unknown".to_string()
}
