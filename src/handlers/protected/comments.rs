use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::catalog::CommentCreate;
use crate::state::AppState;

/// POST /api/comments - attach a comment to a product
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CommentCreate>,
) -> Result<Json<Value>, ApiError> {
    let comment = state.catalog.add_comment(user.id, payload).await?;
    Ok(Json(json!({ "success": true, "data": comment })))
}
