//! Category endpoints
//!
//! Reads are public; create/update/delete sit behind the bearer check
//! (see `http::server::build_router`).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::db::CategoryRepo;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{require_name, Category, CategoryPatch, CreateCategoryRequest};

use super::StatusResponse;

/// POST /category/create
async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    require_name("category name", &req.name)?;
    let category = CategoryRepo::new(&state.pool).create(req).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /category/{id}
async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Category>, ApiError> {
    let category = CategoryRepo::new(&state.pool).get(id).await?;
    Ok(Json(category))
}

/// GET /category - list all categories, ordered by id
async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = CategoryRepo::new(&state.pool).get_all().await?;
    Ok(Json(categories))
}

/// PATCH /category/{id}
async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<CategoryPatch>,
) -> Result<Json<StatusResponse>, ApiError> {
    if let Some(name) = &patch.name {
        require_name("category name", name)?;
    }
    CategoryRepo::new(&state.pool).update(id, patch).await?;
    Ok(Json(StatusResponse::success("Category updated successfully")))
}

/// DELETE /category/{id}
async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<StatusResponse>, ApiError> {
    CategoryRepo::new(&state.pool).delete(id).await?;
    Ok(Json(StatusResponse::success("Category deleted successfully")))
}

/// Public category routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/category", get(list_categories))
        .route("/category/{id}", get(get_category))
}

/// Bearer-protected category routes
pub fn protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/category/create", post(create_category))
        .route(
            "/category/{id}",
            patch(update_category).delete(delete_category),
        )
}
