//! Product endpoints
//!
//! Category references in create/update bodies are category names; an
//! unknown name fails the whole operation with a reference error and the
//! store is left as it was.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::db::ProductRepo;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{require_name, CreateProductRequest, Product, ProductPatch};

use super::StatusResponse;

/// POST /product/create
async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    require_name("product name", &req.name)?;
    let product = ProductRepo::new(&state.pool).create(req).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /product/{id}
async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ApiError> {
    let product = ProductRepo::new(&state.pool).get(id).await?;
    Ok(Json(product))
}

/// GET /category/{id}/products - products associated with a category
async fn products_by_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = ProductRepo::new(&state.pool).list_by_category(id).await?;
    Ok(Json(products))
}

/// PATCH /product/{id}
async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<StatusResponse>, ApiError> {
    if let Some(name) = &patch.name {
        require_name("product name", name)?;
    }
    ProductRepo::new(&state.pool).update(id, patch).await?;
    Ok(Json(StatusResponse::success("Product updated successfully")))
}

/// DELETE /product/{id}
async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<StatusResponse>, ApiError> {
    ProductRepo::new(&state.pool).delete(id).await?;
    Ok(Json(StatusResponse::success("Product deleted successfully")))
}

/// Public product routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/product/{id}", get(get_product))
        .route("/category/{id}/products", get(products_by_category))
}

/// Bearer-protected product routes
pub fn protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/product/create", post(create_product))
        .route(
            "/product/{id}",
            patch(update_product).delete(delete_product),
        )
}
