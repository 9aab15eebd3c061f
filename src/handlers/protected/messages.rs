use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::messaging::MessageCreate;
use crate::state::AppState;

/// GET /api/messages - the caller's threads, one per peer, with summaries
pub async fn conversations(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let threads = state.messages.conversations(user.id).await?;
    Ok(Json(json!({ "success": true, "data": threads })))
}

/// GET /api/messages/:peer_id - full history with one peer, oldest first
pub async fn thread(
    State(state): State<AppState>,
    user: AuthUser,
    Path(peer_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let messages = state.messages.thread_with(user.id, peer_id).await?;
    Ok(Json(json!({ "success": true, "data": messages })))
}

/// POST /api/messages - send a direct message
pub async fn send(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<MessageCreate>,
) -> Result<Json<Value>, ApiError> {
    let message = state.messages.send_message(user.id, payload).await?;
    Ok(Json(json!({ "success": true, "data": message })))
}
