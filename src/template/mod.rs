//! HTML email templates.
//!
//! - Variable substitution engine for `{{key}}` placeholders
//! - Template storage backends (memory, PostgreSQL)
//! - Authoring lifecycle with pro/publish gates
//!
//! # Example
//!
//! ```ignore
//! let service = TemplateService::new(Arc::new(MemoryTemplateStore::new()));
//!
//! service.create_template(&admin, TemplateInput {
//!     name: "Welcome".to_string(),
//!     slug: "welcome".to_string(),
//!     html: "<p>Hi {{name}}</p>".to_string(),
//!     ..Default::default()
//! }).await?;
//!
//! let rendered = service.render_public("welcome", &[TemplateVariable {
//!     key: "name".to_string(),
//!     value: Some("Sam".to_string()),
//! }]).await?;
//! assert_eq!(rendered.html, "<p>Hi Sam</p>");
//! ```

pub mod factory;
pub mod memory_store;
pub mod postgres_store;
pub mod service;
pub mod store;
pub mod substitution;
pub mod types;

pub use factory::create_template_repository;
pub use memory_store::MemoryTemplateStore;
pub use postgres_store::PostgresTemplateStore;
pub use service::TemplateService;
pub use store::{DeleteOutcome, TemplateRepository, TemplateStoreError};
pub use substitution::{extract_placeholders, substitute};
pub use types::{
    RenderedTemplate, Template, TemplateFlag, TemplateInput, TemplateListResponse,
    TemplateSummary, TemplateVariable, TemplateVariableDef, UpdateTemplateInput,
};
