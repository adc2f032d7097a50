//! Contact form endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::contact::{Contact, ContactInput};
use crate::error::Result;
use crate::server::{AppJson, AppState, StaffActor};

/// POST /api/contact
#[tracing::instrument(name = "http.create_contact", skip_all)]
pub async fn create_contact(
    State(state): State<AppState>,
    AppJson(input): AppJson<ContactInput>,
) -> Result<(StatusCode, Json<Contact>)> {
    let outcome = state.contacts.create_contact(input).await?;
    Ok((StatusCode::CREATED, Json(state.follow_ups.complete(outcome))))
}

/// GET /api/dashboard/contacts
#[tracing::instrument(name = "http.list_contacts", skip_all)]
pub async fn list_contacts(
    State(state): State<AppState>,
    _staff: StaffActor,
) -> Result<Json<Vec<Contact>>> {
    Ok(Json(state.contacts.list_contacts().await?))
}

/// DELETE /api/dashboard/contacts/{id}
#[tracing::instrument(name = "http.delete_contact", skip(state, _staff))]
pub async fn delete_contact(
    State(state): State<AppState>,
    _staff: StaffActor,
    Path(contact_id): Path<Uuid>,
) -> Result<Json<Contact>> {
    Ok(Json(state.contacts.delete_contact(contact_id).await?))
}
