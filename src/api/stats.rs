//! Dashboard totals.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::Result;
use crate::server::{AppState, StaffActor};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_users: u64,
    pub total_templates: u64,
    pub total_subscriptions: u64,
}

/// GET /api/dashboard/stats
#[tracing::instrument(name = "http.stats", skip_all)]
pub async fn stats(
    State(state): State<AppState>,
    _staff: StaffActor,
) -> Result<Json<StatsResponse>> {
    let (total_users, total_templates, total_subscriptions) = futures::try_join!(
        state.users.count(),
        state.templates.count(),
        state.billing.count_subscriptions(),
    )?;

    Ok(Json(StatsResponse {
        total_users,
        total_templates,
        total_subscriptions,
    }))
}
