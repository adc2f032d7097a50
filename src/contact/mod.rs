//! Public contact form submissions.

pub mod factory;
pub mod memory_store;
pub mod postgres_store;
pub mod service;
pub mod store;
pub mod types;

pub use factory::create_contact_repository;
pub use memory_store::MemoryContactStore;
pub use postgres_store::PostgresContactStore;
pub use service::ContactService;
pub use store::{ContactRepository, ContactStoreError};
pub use types::{Contact, ContactInput};
