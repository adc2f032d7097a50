mod app;
pub mod middleware;
mod state;

pub use app::create_app;
pub use middleware::{AppJson, DashboardActor, StaffActor};
pub use state::{AppState, StateParts};
