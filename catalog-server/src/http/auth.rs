//! Bearer-token middleware
//!
//! The token is the user's stored password verifier; a request is
//! authorized when some user row holds it. Malformed headers are a
//! validation error, unknown tokens are 401.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::db::UserRepo;
use crate::models::ValidationError;

use super::error::ApiError;
use super::server::AppState;

/// Require a valid `Authorization: Bearer <token>` header.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Validation(ValidationError::Empty {
            field: "Authorization header",
        }))?;

    let token = header_value.strip_prefix("Bearer ").ok_or(ApiError::Validation(
        ValidationError::InvalidFormat {
            field: "Authorization header",
            reason: "expected 'Bearer <token>'",
        },
    ))?;

    let user = UserRepo::new(&state.pool).find_by_token(token).await?;
    match user {
        Some(user) => {
            tracing::debug!(username = %user.username, "authorized request");
            Ok(next.run(request).await)
        }
        None => Err(ApiError::Unauthorized),
    }
}
