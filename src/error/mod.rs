//! Centralized API error handling for Dialtone
//!
//! This module provides a unified error type for API responses with proper
//! HTTP status code mapping and JSON error responses. Domain errors cross
//! into `ApiError` through `From` impls, never through string matching.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::users::UserError;

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("too many requests")]
    RateLimited,

    /// Covers wrong, absent, and expired codes alike. Callers must not be
    /// able to tell whether a phone ever requested a code.
    #[error("invalid or expired OTP")]
    InvalidOrExpiredOtp,

    #[error("authorization header with bearer token required")]
    MissingToken,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token")]
    InvalidToken,

    #[error("{0}")]
    NotFound(String),

    /// The payload carries server-side detail for the log; the response
    /// body stays opaque.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in the response
#[derive(Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::RateLimited => "RATE_LIMITED",
            ApiError::InvalidOrExpiredOtp => "INVALID_OR_EXPIRED_OTP",
            ApiError::MissingToken => "MISSING_TOKEN",
            ApiError::TokenExpired => "TOKEN_EXPIRED",
            ApiError::InvalidToken => "INVALID_TOKEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InvalidOrExpiredOtp => StatusCode::UNAUTHORIZED,
            ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::TokenExpired => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Server errors are logged in full and surfaced as a generic
        // message; client errors pass their message through.
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, code = %error_code, "Server error occurred");
                "an internal error occurred".to_string()
            }
            other => {
                tracing::debug!(error = %other, code = %error_code, "Client error occurred");
                other.to_string()
            }
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code: error_code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

// Convenience conversions from domain error types

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidPhone(msg) => ApiError::InvalidInput(msg),
            AuthError::InvalidOrExpiredOtp => ApiError::InvalidOrExpiredOtp,
            AuthError::Store(_)
            | AuthError::Database(_)
            | AuthError::Token(_)
            | AuthError::OtpGeneration(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidId(_) => ApiError::InvalidInput(err.to_string()),
            UserError::NotFound => ApiError::NotFound("user not found".to_string()),
            UserError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

/// Result type alias using ApiError
pub type ApiResult<T> = Result<T, ApiError>;
