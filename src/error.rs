use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::schemas::ErrorResponse;

/// Error taxonomy for the whole API surface. Every handler failure maps
/// onto one of these variants, which render as a JSON [`ErrorResponse`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input or field constraint violations.
    #[error("{0}")]
    Validation(String),
    /// Duplicate username at registration.
    #[error("{0}")]
    Conflict(String),
    /// Domain-level rejections: empty cart, insufficient stock, no file.
    #[error("{0}")]
    BadRequest(String),
    /// Bad credentials or an invalid/expired token.
    #[error("{0}")]
    Authentication(String),
    /// Authenticated but missing the admin role.
    #[error("Admin role required")]
    Forbidden,
    /// Missing product, cart row or order.
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Conflict(_) => (StatusCode::BAD_REQUEST, "USERNAME_ALREADY_EXISTS"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Authentication(_) => (StatusCode::UNAUTHORIZED, "AUTHENTICATION_FAILED"),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Server-side failures keep their details in the log, not the body.
        let message = match &self {
            ApiError::Database(db_error) => {
                error!("Database error: {}", db_error);
                "Internal server error".to_string()
            }
            ApiError::Internal(detail) => {
                error!("Internal error: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            success: false,
        };
        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {field}"))
                })
            })
            .collect::<Vec<_>>()
            .join("; ");
        ApiError::Validation(message)
    }
}
