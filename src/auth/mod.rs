//! Authentication module for Dialtone
//!
//! Phone-number OTP login:
//! - one-time code generation and cache-backed issuance
//! - single-use validation with indistinguishable failure modes
//! - JWT session token minting and verification

mod jwt;
mod otp;
mod phone;
mod service;

pub use jwt::{mint_token, verify_token, Claims, JwtError};
pub use otp::{generate_numeric_otp, OtpError, OTP_LENGTH};
pub use phone::is_valid_phone;
pub use service::{AuthError, AuthService};
