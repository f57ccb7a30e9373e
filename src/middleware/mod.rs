//! Middleware for the Dialtone API
//!
//! Request tracing, rate limiting, security headers, and bearer-token
//! authentication.

pub mod auth;
mod rate_limit;
mod security;
mod tracing;

pub use auth::AuthenticatedUser;
pub use rate_limit::{global_rate_limit, otp_rate_limit};
pub use security::security_headers;
pub use tracing::request_tracing;
