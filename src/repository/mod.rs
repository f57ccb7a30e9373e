//! Durable user storage for Dialtone
//!
//! The one table that matters: users keyed by id with a unique phone. The
//! trait keeps the auth and directory services testable against an
//! in-memory fake.

mod memory;
mod postgres;

pub use memory::MemoryUserRepository;
pub use postgres::PostgresUserRepository;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::User;

/// Repository errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The phone's unique constraint fired; somebody else created the row
    /// first.
    #[error("phone already registered")]
    DuplicatePhone,

    #[error("database error: {0}")]
    Database(String),
}

/// Durable identity store.
///
/// Absence is reported as `Ok(None)`, never folded into the error type, so
/// callers can tell "no such row" apart from a failed round-trip.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user with a fresh id and the given phone.
    async fn create(&self, phone: &str) -> Result<User, RepositoryError>;

    /// Fetch a user by exact phone.
    async fn get_by_phone(&self, phone: &str) -> Result<Option<User>, RepositoryError>;

    /// Fetch a user by id.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    /// List users newest-first with the full matching count.
    ///
    /// An empty `phone_filter` matches everyone; a non-empty one is an
    /// exact match.
    async fn list(
        &self,
        phone_filter: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<User>, i64), RepositoryError>;
}
