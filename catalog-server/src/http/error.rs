//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with stable machine-readable
//! kinds; store-level failures are logged server-side and returned as a
//! generic 500 body, never as raw database error text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Unique-constraint conflict, e.g. duplicate name (409)
    AlreadyExists { resource: &'static str, name: String },

    /// A referenced category does not exist (400)
    Reference { name: String },

    /// Update with no fields present (400)
    NoFieldsToUpdate,

    /// Bearer token did not match any user (401)
    Unauthorized,

    /// Store-level failure during an operation (500, logged, retryable)
    Database(DbError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_error",
                    "message": e.to_string()
                }),
            ),
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": format!("{} '{}' not found", resource, id)
                }),
            ),
            Self::AlreadyExists { resource, name } => (
                StatusCode::CONFLICT,
                json!({
                    "error": "already_exists",
                    "message": format!("{} '{}' already exists", resource, name)
                }),
            ),
            Self::Reference { name } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "reference_error",
                    "message": format!("category '{}' does not exist", name)
                }),
            ),
            Self::NoFieldsToUpdate => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_error",
                    "message": "no fields to update"
                }),
            ),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": "unauthorized",
                    "message": "invalid or missing bearer token"
                }),
            ),
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::AlreadyExists { resource, name } => Self::AlreadyExists { resource, name },
            DbError::CategoryNotFound { name } => Self::Reference { name },
            DbError::NoFieldsToUpdate => Self::NoFieldsToUpdate,
            DbError::Sqlx(_) => Self::Database(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn validation_error_is_400() {
        let err = ApiError::Validation(ValidationError::Empty { field: "name" });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let err = ApiError::NotFound {
            resource: "product",
            id: "7".into(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_name_is_409() {
        let err = ApiError::AlreadyExists {
            resource: "category",
            name: "books".into(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_category_reference_is_400() {
        let err = ApiError::from(DbError::CategoryNotFound {
            name: "ghost".into(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_patch_is_400() {
        let err = ApiError::from(DbError::NoFieldsToUpdate);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_token_is_401() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
