//! Dashboard user moderation endpoints.
//!
//! Role rules live in `users::policy`; these handlers only require a session
//! with dashboard access.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::server::{AppJson, AppState, DashboardActor, StaffActor};
use crate::users::{ApiKey, ChangeRoleRequest, User};

/// GET /api/dashboard/users
#[tracing::instrument(name = "http.list_users", skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    _staff: StaffActor,
) -> Result<Json<Vec<User>>> {
    Ok(Json(state.users.list_users().await?))
}

/// POST /api/dashboard/users/{id}/toggle-ban
#[tracing::instrument(name = "http.toggle_ban", skip(state, actor))]
pub async fn toggle_ban(
    State(state): State<AppState>,
    DashboardActor(actor): DashboardActor,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>> {
    let outcome = state.users.toggle_ban(&actor, user_id).await?;
    Ok(Json(state.follow_ups.complete(outcome)))
}

/// POST /api/dashboard/users/{id}/toggle-permission
#[tracing::instrument(name = "http.toggle_permission", skip(state, actor))]
pub async fn toggle_permission(
    State(state): State<AppState>,
    DashboardActor(actor): DashboardActor,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>> {
    let outcome = state.users.toggle_website_permission(&actor, user_id).await?;
    Ok(Json(state.follow_ups.complete(outcome)))
}

/// PUT /api/dashboard/users/{id}/role
#[tracing::instrument(
    name = "http.change_role",
    skip(state, actor, request),
    fields(role = %request.role)
)]
pub async fn change_role(
    State(state): State<AppState>,
    DashboardActor(actor): DashboardActor,
    Path(user_id): Path<Uuid>,
    AppJson(request): AppJson<ChangeRoleRequest>,
) -> Result<Json<User>> {
    Ok(Json(state.users.change_role(&actor, user_id, request.role).await?))
}

/// DELETE /api/dashboard/users/{id}
#[tracing::instrument(name = "http.delete_user", skip(state, actor))]
pub async fn delete_user(
    State(state): State<AppState>,
    DashboardActor(actor): DashboardActor,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>> {
    Ok(Json(state.users.delete_user(&actor, user_id).await?))
}

/// POST /api/dashboard/api-keys
#[tracing::instrument(name = "http.generate_api_key", skip_all)]
pub async fn generate_api_key(
    State(state): State<AppState>,
    DashboardActor(actor): DashboardActor,
) -> Result<(StatusCode, Json<ApiKey>)> {
    let key = state.users.generate_api_key(&actor).await?;
    Ok((StatusCode::CREATED, Json(key)))
}
