//! Template storage backend factory

use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::postgres::PostgresPool;

use super::memory_store::MemoryTemplateStore;
use super::postgres_store::PostgresTemplateStore;
use super::store::TemplateRepository;

/// Create a template repository based on configuration.
///
/// - `"postgres"`: `PostgresTemplateStore` if a pool is provided
/// - `"memory"` (default): `MemoryTemplateStore`
pub fn create_template_repository(
    settings: &DatabaseConfig,
    postgres_pool: Option<Arc<PostgresPool>>,
) -> Arc<dyn TemplateRepository> {
    match settings.backend.as_str() {
        "postgres" => {
            if let Some(pool) = postgres_pool {
                tracing::info!(backend = "postgres", "Creating PostgreSQL template store");
                Arc::new(PostgresTemplateStore::new(pool.pool().clone()))
            } else {
                tracing::warn!(
                    "PostgreSQL backend requested but no pool provided, falling back to memory"
                );
                Arc::new(MemoryTemplateStore::new())
            }
        }
        _ => {
            tracing::info!(backend = "memory", "Creating memory template store");
            Arc::new(MemoryTemplateStore::new())
        }
    }
}
