// Infrastructure layer (shared components)
pub mod infrastructure;

pub use infrastructure::auth;
pub use infrastructure::config;
pub use infrastructure::error;
pub use infrastructure::metrics;
pub use infrastructure::postgres;

// Domain layer (business logic)
pub mod billing;
pub mod contact;
pub mod mail;
pub mod template;
pub mod users;

// Application layer
pub mod api;
pub mod server;

// Supporting modules
pub mod sdk;
pub mod tasks;
pub mod telemetry;
