//! Billing storage backend factory

use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::postgres::PostgresPool;

use super::memory_store::MemoryBillingStore;
use super::postgres_store::PostgresBillingStore;
use super::store::BillingRepository;

pub fn create_billing_repository(
    settings: &DatabaseConfig,
    postgres_pool: Option<Arc<PostgresPool>>,
) -> Arc<dyn BillingRepository> {
    match settings.backend.as_str() {
        "postgres" => {
            if let Some(pool) = postgres_pool {
                tracing::info!(backend = "postgres", "Creating PostgreSQL billing store");
                Arc::new(PostgresBillingStore::new(pool.pool().clone()))
            } else {
                tracing::warn!(
                    "PostgreSQL backend requested but no pool provided, falling back to memory"
                );
                Arc::new(MemoryBillingStore::new())
            }
        }
        _ => {
            tracing::info!(backend = "memory", "Creating memory billing store");
            Arc::new(MemoryBillingStore::new())
        }
    }
}
