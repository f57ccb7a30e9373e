//! Authentication models for Dialtone

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::User;

/// Request body for OTP issuance
#[derive(Debug, Deserialize, Validate)]
pub struct RequestOtpRequest {
    /// E.164 phone number, e.g. +14155552671
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
}

/// Request body for OTP verification
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,

    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
}

/// Response confirming an OTP was issued
///
/// The code itself is never in the response; delivery happens out of band.
#[derive(Debug, Serialize, Deserialize)]
pub struct OtpSentResponse {
    pub message: String,
}

impl OtpSentResponse {
    pub fn sent() -> Self {
        Self {
            message: "otp_sent".to_string(),
        }
    }
}

/// Response carrying a freshly minted session token
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthTokenResponse {
    pub token: String,
    pub user: User,
}
