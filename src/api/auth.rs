//! Sign-up and sign-in.

use axum::{extract::State, http::StatusCode, Json};

use crate::error::Result;
use crate::server::{AppJson, AppState};
use crate::users::{Session, SignInRequest, SignUpRequest, User};

/// POST /api/auth/sign-up
#[tracing::instrument(name = "http.sign_up", skip_all)]
pub async fn sign_up(
    State(state): State<AppState>,
    AppJson(request): AppJson<SignUpRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let outcome = state.users.register(request).await?;
    Ok((StatusCode::CREATED, Json(state.follow_ups.complete(outcome))))
}

/// POST /api/auth/sign-in
#[tracing::instrument(name = "http.sign_in", skip_all)]
pub async fn sign_in(
    State(state): State<AppState>,
    AppJson(request): AppJson<SignInRequest>,
) -> Result<Json<Session>> {
    Ok(Json(state.users.authenticate(request).await?))
}
