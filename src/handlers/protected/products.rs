use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::catalog::{ProductCreate, ProductPatch};
use crate::state::AppState;

/// POST /api/products - create a product (suppliers only)
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ProductCreate>,
) -> Result<Json<Value>, ApiError> {
    let product = state.catalog.create_product(user.id, payload).await?;
    Ok(Json(json!({ "success": true, "data": product })))
}

/// PUT /api/products/:id - partially update an owned product
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<ProductPatch>,
) -> Result<Json<Value>, ApiError> {
    let product = state.catalog.update_product(user.id, product_id, payload).await?;
    Ok(Json(json!({ "success": true, "data": product })))
}

/// DELETE /api/products/:id - delete an owned product
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.catalog.delete_product(user.id, product_id).await?;
    Ok(Json(json!({
        "success": true,
        "data": { "message": "Product deleted successfully" }
    })))
}

/// POST /api/products/:id/like - toggle the caller's like on a product
pub async fn like(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let outcome = state.catalog.toggle_like(user.id, product_id).await?;
    Ok(Json(json!({ "success": true, "data": outcome })))
}
