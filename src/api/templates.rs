//! Dashboard template authoring endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::server::{AppJson, AppState, DashboardActor, StaffActor};
use crate::template::{
    Template, TemplateInput, TemplateListResponse, TemplateSummary, UpdateTemplateInput,
};

/// GET /api/dashboard/templates
#[tracing::instrument(name = "http.list_templates", skip_all)]
pub async fn list_templates(
    State(state): State<AppState>,
    _staff: StaffActor,
) -> Result<Json<TemplateListResponse<Template>>> {
    let data = state.templates.get_all_templates().await?;
    let total = data.len();
    Ok(Json(TemplateListResponse { data, total }))
}

/// POST /api/dashboard/templates
#[tracing::instrument(
    name = "http.create_template",
    skip(state, actor, input),
    fields(slug = %input.slug)
)]
pub async fn create_template(
    State(state): State<AppState>,
    DashboardActor(actor): DashboardActor,
    AppJson(input): AppJson<TemplateInput>,
) -> Result<(StatusCode, Json<Template>)> {
    let template = state.templates.create_template(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// GET /api/dashboard/templates/{id}
#[tracing::instrument(name = "http.get_template", skip(state, _staff))]
pub async fn get_template(
    State(state): State<AppState>,
    _staff: StaffActor,
    Path(template_id): Path<Uuid>,
) -> Result<Json<TemplateSummary>> {
    state
        .templates
        .get_template_by_id(template_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Template not found".to_string()))
}

/// PUT /api/dashboard/templates/{id}
#[tracing::instrument(name = "http.update_template", skip(state, actor, fields))]
pub async fn update_template(
    State(state): State<AppState>,
    DashboardActor(actor): DashboardActor,
    Path(template_id): Path<Uuid>,
    AppJson(fields): AppJson<TemplateInput>,
) -> Result<Json<Template>> {
    let input = UpdateTemplateInput {
        id: template_id,
        fields,
    };
    Ok(Json(state.templates.update_template(&actor, input).await?))
}

/// DELETE /api/dashboard/templates/{id}
#[tracing::instrument(name = "http.delete_template", skip(state, _staff))]
pub async fn delete_template(
    State(state): State<AppState>,
    _staff: StaffActor,
    Path(template_id): Path<Uuid>,
) -> Result<Json<Template>> {
    Ok(Json(state.templates.delete_template(template_id).await?))
}

/// POST /api/dashboard/templates/{id}/toggle-pro
#[tracing::instrument(name = "http.toggle_pro", skip(state, _staff))]
pub async fn toggle_pro(
    State(state): State<AppState>,
    _staff: StaffActor,
    Path(template_id): Path<Uuid>,
) -> Result<Json<Template>> {
    Ok(Json(state.templates.toggle_pro(template_id).await?))
}

/// POST /api/dashboard/templates/{id}/toggle-publish
#[tracing::instrument(name = "http.toggle_publish", skip(state, _staff))]
pub async fn toggle_publish(
    State(state): State<AppState>,
    _staff: StaffActor,
    Path(template_id): Path<Uuid>,
) -> Result<Json<Template>> {
    Ok(Json(state.templates.toggle_publish(template_id).await?))
}
