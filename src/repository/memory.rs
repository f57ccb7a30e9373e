//! In-memory user repository
//!
//! Vec-backed fake mirroring the Postgres implementation's semantics,
//! including the unique-phone constraint.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{RepositoryError, UserRepository};
use crate::models::User;

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, phone: &str) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().await;

        if users.iter().any(|u| u.phone == phone) {
            return Err(RepositoryError::DuplicatePhone);
        }

        let user = User {
            id: Uuid::new_v4(),
            phone: phone.to_string(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn get_by_phone(&self, phone: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.phone == phone).cloned())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn list(
        &self,
        phone_filter: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<User>, i64), RepositoryError> {
        let users = self.users.lock().await;

        let mut matching: Vec<User> = users
            .iter()
            .filter(|u| phone_filter.is_empty() || u.phone == phone_filter)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();

        Ok((items, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_fetch() {
        let repo = MemoryUserRepository::new();

        let created = repo.create("+14155552671").await.unwrap();

        let by_phone = repo.get_by_phone("+14155552671").await.unwrap().unwrap();
        let by_id = repo.get_by_id(created.id).await.unwrap().unwrap();

        assert_eq!(by_phone.id, created.id);
        assert_eq!(by_id.phone, "+14155552671");
    }

    #[tokio::test]
    async fn test_duplicate_phone_rejected() {
        let repo = MemoryUserRepository::new();

        repo.create("+14155552671").await.unwrap();
        let err = repo.create("+14155552671").await.unwrap_err();

        assert!(matches!(err, RepositoryError::DuplicatePhone));
    }

    #[tokio::test]
    async fn test_absent_rows_are_none_not_errors() {
        let repo = MemoryUserRepository::new();

        assert!(repo.get_by_phone("+14155552671").await.unwrap().is_none());
        assert!(repo.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first_with_total() {
        let repo = MemoryUserRepository::new();

        repo.create("+14155550001").await.unwrap();
        repo.create("+14155550002").await.unwrap();
        repo.create("+14155550003").await.unwrap();

        let (items, total) = repo.list("", 10, 0).await.unwrap();

        assert_eq!(total, 3);
        assert_eq!(items[0].phone, "+14155550003");
        assert_eq!(items[2].phone, "+14155550001");
    }

    #[tokio::test]
    async fn test_list_filter_and_window() {
        let repo = MemoryUserRepository::new();

        repo.create("+14155550001").await.unwrap();
        repo.create("+14155550002").await.unwrap();

        let (items, total) = repo.list("+14155550001", 10, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items.len(), 1);

        // Total counts the whole matching set even when the window is past it.
        let (items, total) = repo.list("", 10, 5).await.unwrap();
        assert_eq!(total, 2);
        assert!(items.is_empty());
    }
}
