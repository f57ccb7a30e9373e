//! Data models for Dialtone

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod auth;
pub mod user;

pub use auth::*;
pub use user::*;

/// A registered user, created on first successful OTP verification.
///
/// Rows are append-only: the service never mutates or deletes them, and
/// `phone` is unique across the table.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}
