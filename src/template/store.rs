//! Backend trait for template storage.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::types::{Template, TemplateFlag};

/// Errors that can occur during template storage operations.
#[derive(Debug, Error)]
pub enum TemplateStoreError {
    /// Another template already uses this slug
    #[error("Slug already in use: {0}")]
    DuplicateSlug(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result of a guarded delete
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted(Template),
    NotFound,
    /// The template is published and was left in place
    Published,
}

/// Persistence collaborator for templates.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Backend type identifier
    fn backend_type(&self) -> &'static str;

    async fn insert(&self, template: &Template) -> Result<(), TemplateStoreError>;

    /// Overwrite every field of an existing record. Returns `false` when no
    /// record has this id.
    async fn replace(&self, template: &Template) -> Result<bool, TemplateStoreError>;

    /// Delete only if the template is not published.
    async fn delete_unpublished(&self, id: Uuid) -> Result<DeleteOutcome, TemplateStoreError>;

    /// Flip a boolean gate in place and return the updated record.
    async fn toggle(
        &self,
        id: Uuid,
        flag: TemplateFlag,
    ) -> Result<Option<Template>, TemplateStoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Template>, TemplateStoreError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Template>, TemplateStoreError>;

    /// All templates, newest first
    async fn list(&self) -> Result<Vec<Template>, TemplateStoreError>;

    async fn count(&self) -> Result<u64, TemplateStoreError>;
}
