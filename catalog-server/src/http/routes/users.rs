//! User registration endpoint
//!
//! Registration is public; the derived verifier doubles as the caller's
//! bearer token for the protected routes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::post, Json, Router};

use crate::db::UserRepo;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{derive_token, CreateUserRequest, User, Username, ValidationError};

/// POST /users/create - register a user
async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let username = Username::new(&req.username)?;
    if req.password.is_empty() {
        return Err(ApiError::Validation(ValidationError::Empty {
            field: "password",
        }));
    }

    let token = derive_token(username.as_str(), &req.password);
    let user = UserRepo::new(&state.pool)
        .create(username.as_str(), req.full_name.as_deref(), &token)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/users/create", post(create_user))
}
