use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A required secret or credential is missing
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The actor targeted itself with an operation that forbids it
    #[error("{0}")]
    InvalidOperation(String),

    /// The requested change would leave the entity unchanged
    #[error("{0}")]
    NoOp(String),

    #[error("{0}")]
    InvalidSignature(String),

    /// Database, gateway or mail failure. The message is already safe to
    /// show to the caller; the cause is logged where the error is wrapped.
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Build a mapper that logs a collaborator failure and replaces it with a
    /// generic "Failed to {action}" message.
    pub fn upstream<E: Display>(action: &'static str) -> impl FnOnce(E) -> AppError {
        move |err| {
            tracing::error!(error = %err, action = action, "Upstream operation failed");
            AppError::Upstream(format!("Failed to {}. Please try again later.", action))
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) | AppError::Configuration(_) => "CONFIG_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::InvalidOperation(_) => "INVALID_OPERATION",
            AppError::NoOp(_) => "NO_OP",
            AppError::InvalidSignature(_) => "INVALID_SIGNATURE",
            AppError::Upstream(_) => "UPSTREAM_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::Configuration(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Validation(_) | AppError::NoOp(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidOperation(_) | AppError::InvalidSignature(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Error body. `message` is the single line shown to the user.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let log_message = self.to_string();

        let client_message = match &self {
            AppError::Config(_) if is_production() => "Configuration error".to_string(),
            _ => log_message.clone(),
        };

        if status.is_server_error() {
            tracing::error!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API error"
            );
        } else {
            tracing::debug!(
                code = %code,
                status = %status.as_u16(),
                message = %log_message,
                "API request rejected"
            );
        }

        let body = ErrorResponse {
            message: client_message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InvalidSignature("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::Upstream("x".into()).status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_upstream_hides_cause() {
        let err = AppError::upstream("create template")("connection refused by 10.0.0.3");
        assert_eq!(
            err.to_string(),
            "Failed to create template. Please try again later."
        );
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[test]
    fn test_display_is_bare_message() {
        let err = AppError::Conflict("Template is published. You can't delete it.".into());
        assert_eq!(err.to_string(), "Template is published. You can't delete it.");
        assert_eq!(err.code(), "CONFLICT");
    }
}
