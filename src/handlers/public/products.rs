use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::catalog::ProductFilter;
use crate::state::AppState;

/// GET /api/products - list products with optional filters and pagination
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Value>, ApiError> {
    let page = state.catalog.list_products(filter).await?;
    Ok(Json(json!({ "success": true, "data": page })))
}

/// GET /api/products/:id - one product plus its comments, newest first
pub async fn get(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let detail = state.catalog.get_product(product_id).await?;
    Ok(Json(json!({ "success": true, "data": detail })))
}
