//! Accounts, sign-up/sign-in, and moderation rules.

pub mod api_keys;
pub mod factory;
pub mod memory_store;
pub mod policy;
pub mod postgres_store;
pub mod service;
pub mod store;
pub mod types;

pub use factory::create_user_repository;
pub use memory_store::MemoryUserStore;
pub use policy::{authorize, UserAction};
pub use postgres_store::PostgresUserStore;
pub use service::UserService;
pub use store::{UserRepository, UserStoreError};
pub use types::{ApiKey, ChangeRoleRequest, Session, SignInRequest, SignUpRequest, User};
