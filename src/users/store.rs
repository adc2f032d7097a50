//! Backend trait for account storage.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::types::{ApiKey, User};

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    fn backend_type(&self) -> &'static str;

    async fn insert(&self, user: &User) -> Result<(), UserStoreError>;

    /// Overwrite mutable account fields. Returns `false` when no record has
    /// this id.
    async fn update(&self, user: &User) -> Result<bool, UserStoreError>;

    /// Remove the account and its API keys. Payments and subscriptions
    /// are kept.
    async fn delete(&self, id: Uuid) -> Result<bool, UserStoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserStoreError>;

    /// Emails are stored lowercased; callers pass a normalized address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError>;

    /// All accounts, newest first
    async fn list(&self) -> Result<Vec<User>, UserStoreError>;

    async fn count(&self) -> Result<u64, UserStoreError>;

    async fn insert_api_key(&self, key: &ApiKey) -> Result<(), UserStoreError>;
}
