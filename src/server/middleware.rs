//! Request extractors for sessions and JSON bodies.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};

use super::AppState;
use crate::auth::Actor;
use crate::error::AppError;

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn unauthorized() -> AppError {
    AppError::Unauthorized("Unauthorized".to_string())
}

/// Signed-in identity. The token only names the account; role and flags are
/// reloaded from the store so bans and role changes apply immediately.
impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers).ok_or_else(|| {
            tracing::debug!("Missing bearer token");
            unauthorized()
        })?;

        let claims = state.jwt_validator.validate(token).map_err(|e| {
            tracing::warn!(error = %e, "Session token rejected");
            unauthorized()
        })?;

        state.users.load_actor(claims.sub).await
    }
}

/// Signed-in identity allowed to use the dashboard.
///
/// Banned or permission-revoked accounts get 403 before anything else runs.
#[derive(Debug, Clone)]
pub struct DashboardActor(pub Actor);

impl FromRequestParts<AppState> for DashboardActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let actor = Actor::from_request_parts(parts, state).await?;
        if !actor.has_dashboard_access() {
            tracing::warn!(user_id = %actor.id, "Dashboard access denied");
            return Err(AppError::Forbidden("Forbidden".to_string()));
        }
        Ok(Self(actor))
    }
}

/// Dashboard identity with an ADMIN or SUPERADMIN role.
#[derive(Debug, Clone)]
pub struct StaffActor(pub Actor);

impl FromRequestParts<AppState> for StaffActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let DashboardActor(actor) = DashboardActor::from_request_parts(parts, state).await?;
        if !actor.role.is_staff() {
            return Err(unauthorized());
        }
        Ok(Self(actor))
    }
}

/// `Json` whose rejections use the service error body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}
