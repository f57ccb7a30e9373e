//! Authentication HTTP handlers
//!
//! Endpoints for OTP issuance and verification.

use axum::{extract::State, Json};
use validator::Validate;

use crate::error::ApiResult;
use crate::models::{AuthTokenResponse, OtpSentResponse, RequestOtpRequest, VerifyOtpRequest};
use crate::state::AppState;

/// POST /api/auth/request-otp - Generate a one-time code for a phone number
pub async fn request_otp(
    State(state): State<AppState>,
    Json(req): Json<RequestOtpRequest>,
) -> ApiResult<Json<OtpSentResponse>> {
    req.validate()?;

    let code = state.auth_service.request_otp(&req.phone).await?;

    // Development stand-in for an SMS gateway. Logging the code is not
    // production-safe; a real deployment must deliver it out of band and
    // drop this line.
    tracing::info!(
        phone = %req.phone.trim(),
        code = %code,
        "OTP issued (dev-only delivery: logged instead of sent)"
    );

    Ok(Json(OtpSentResponse::sent()))
}

/// POST /api/auth/verify-otp - Verify a code and issue a session token
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> ApiResult<Json<AuthTokenResponse>> {
    req.validate()?;

    let (token, user) = state.auth_service.verify_otp(&req.phone, &req.code).await?;

    Ok(Json(AuthTokenResponse { token, user }))
}
