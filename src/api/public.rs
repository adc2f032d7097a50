//! Unauthenticated template API.
//!
//! Pro-only templates are never served here, whoever is calling.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::metrics::TemplateMetrics;
use crate::server::{AppJson, AppState};
use crate::template::{RenderedTemplate, TemplateSummary, TemplateVariable};

#[derive(Debug, Default, Deserialize)]
pub struct RenderRequest {
    #[serde(default)]
    pub variables: Vec<TemplateVariable>,
}

#[derive(Debug, Serialize)]
pub struct PublicTemplateList {
    pub data: Vec<TemplateSummary>,
}

/// Label an error for the request counter and hide store failures behind a
/// fixed message.
fn public_error(
    endpoint: &'static str,
    failure_message: &'static str,
) -> impl FnOnce(AppError) -> AppError {
    move |err| {
        let outcome = match &err {
            AppError::NotFound(_) => "not_found",
            AppError::Forbidden(_) => "forbidden",
            _ => "error",
        };
        TemplateMetrics::record_request(endpoint, outcome);

        match err {
            AppError::NotFound(_) | AppError::Forbidden(_) => err,
            other => {
                tracing::error!(
                    error = %other,
                    endpoint = endpoint,
                    "Public template request failed"
                );
                AppError::Internal(failure_message.to_string())
            }
        }
    }
}

/// GET /api/templates
#[tracing::instrument(name = "http.list_public_templates", skip(state))]
pub async fn list_templates(State(state): State<AppState>) -> Result<Json<PublicTemplateList>> {
    let data = state
        .templates
        .get_public_templates()
        .await
        .map_err(public_error("list", "Failed to get templates"))?;

    TemplateMetrics::record_request("list", "ok");
    Ok(Json(PublicTemplateList { data }))
}

/// GET /api/templates/{slug}
#[tracing::instrument(name = "http.get_public_template", skip(state))]
pub async fn get_template(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<TemplateSummary>> {
    let template = state
        .templates
        .get_public_template(&slug)
        .await
        .map_err(public_error("get", "Failed to get template by slug"))?;

    TemplateMetrics::record_request("get", "ok");
    Ok(Json(template))
}

/// POST /api/templates/{slug}/render
#[tracing::instrument(
    name = "http.render_template",
    skip(state, request),
    fields(variables = request.variables.len())
)]
pub async fn render_template(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    AppJson(request): AppJson<RenderRequest>,
) -> Result<Json<RenderedTemplate>> {
    let rendered = state
        .templates
        .render_public(&slug, &request.variables)
        .await
        .map_err(public_error("render", "Failed to render template"))?;

    TemplateMetrics::record_request("render", "ok");
    Ok(Json(rendered))
}

/// OPTIONS on the public template routes. The CORS layer adds
/// `Access-Control-Allow-Origin`.
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}
