//! Backend trait for contact form submissions.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::types::Contact;

#[derive(Debug, Error)]
pub enum ContactStoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait ContactRepository: Send + Sync {
    fn backend_type(&self) -> &'static str;

    async fn insert(&self, contact: &Contact) -> Result<(), ContactStoreError>;

    /// Returns the removed submission, if it existed.
    async fn delete(&self, id: Uuid) -> Result<Option<Contact>, ContactStoreError>;

    /// All submissions, newest first
    async fn list(&self) -> Result<Vec<Contact>, ContactStoreError>;
}
