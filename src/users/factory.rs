//! Account storage backend factory

use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::postgres::PostgresPool;

use super::memory_store::MemoryUserStore;
use super::postgres_store::PostgresUserStore;
use super::store::UserRepository;

pub fn create_user_repository(
    settings: &DatabaseConfig,
    postgres_pool: Option<Arc<PostgresPool>>,
) -> Arc<dyn UserRepository> {
    match settings.backend.as_str() {
        "postgres" => {
            if let Some(pool) = postgres_pool {
                tracing::info!(backend = "postgres", "Creating PostgreSQL user store");
                Arc::new(PostgresUserStore::new(pool.pool().clone()))
            } else {
                tracing::warn!(
                    "PostgreSQL backend requested but no pool provided, falling back to memory"
                );
                Arc::new(MemoryUserStore::new())
            }
        }
        _ => {
            tracing::info!(backend = "memory", "Creating memory user store");
            Arc::new(MemoryUserStore::new())
        }
    }
}
