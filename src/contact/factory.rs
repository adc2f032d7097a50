//! Contact storage backend factory

use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::postgres::PostgresPool;

use super::memory_store::MemoryContactStore;
use super::postgres_store::PostgresContactStore;
use super::store::ContactRepository;

pub fn create_contact_repository(
    settings: &DatabaseConfig,
    postgres_pool: Option<Arc<PostgresPool>>,
) -> Arc<dyn ContactRepository> {
    match (settings.backend.as_str(), postgres_pool) {
        ("postgres", Some(pool)) => {
            tracing::info!(backend = "postgres", "Creating PostgreSQL contact store");
            Arc::new(PostgresContactStore::new(pool.pool().clone()))
        }
        ("postgres", None) => {
            tracing::warn!(
                "PostgreSQL backend requested but no pool provided, falling back to memory"
            );
            Arc::new(MemoryContactStore::new())
        }
        _ => {
            tracing::info!(backend = "memory", "Creating memory contact store");
            Arc::new(MemoryContactStore::new())
        }
    }
}
