//! API layer - HTTP endpoint handlers organized by domain.

mod auth;
mod billing;
mod contact;
mod health;
mod metrics;
mod public;
mod routes;
mod stats;
mod templates;
mod users;

pub use health::HealthResponse;
pub use public::{PublicTemplateList, RenderRequest};
pub use routes::{api_routes, public_routes};
pub use stats::StatsResponse;
