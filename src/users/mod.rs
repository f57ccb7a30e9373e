//! User directory service for Dialtone
//!
//! Read side of the user table: single lookups and the paginated,
//! optionally phone-filtered listing.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::models::{User, UserPage};
use crate::repository::{RepositoryError, UserRepository};

/// Page size used when the caller omits `limit` or sends one out of range.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Largest page a caller may request.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// User directory errors
#[derive(Error, Debug)]
pub enum UserError {
    #[error("invalid user id: {0}")]
    InvalidId(String),

    #[error("user not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(String),
}

impl From<RepositoryError> for UserError {
    fn from(e: RepositoryError) -> Self {
        UserError::Database(e.to_string())
    }
}

/// Read-side service over the user repository.
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Fetch a single user by its string id.
    ///
    /// A malformed id is rejected before the repository is touched; an
    /// absent row is `NotFound`, never conflated with a transport failure.
    pub async fn get_user(&self, id: &str) -> Result<User, UserError> {
        let id = id.trim();
        let id = Uuid::parse_str(id).map_err(|_| UserError::InvalidId(id.to_string()))?;

        match self.users.get_by_id(id).await? {
            Some(user) => Ok(user),
            None => Err(UserError::NotFound),
        }
    }

    /// List users newest-first, optionally filtered to an exact phone.
    ///
    /// `page` clamps to at least 1. A `limit` outside [1, 100] — zero and
    /// negatives included — falls back to the default of 20 rather than
    /// the nearest bound. `total` always reflects the full matching set.
    pub async fn list_users(
        &self,
        phone_filter: &str,
        page: i64,
        limit: i64,
    ) -> Result<UserPage, UserError> {
        let (page, limit) = normalize_page(page, limit);
        let offset = (page - 1) * limit;

        let (items, total) = self.users.list(phone_filter.trim(), limit, offset).await?;

        Ok(UserPage {
            items,
            total,
            page,
            limit,
        })
    }
}

fn normalize_page(page: i64, limit: i64) -> (i64, i64) {
    let page = if page < 1 { 1 } else { page };
    let limit = if limit < 1 || limit > MAX_PAGE_LIMIT {
        DEFAULT_PAGE_LIMIT
    } else {
        limit
    };
    (page, limit)
}
