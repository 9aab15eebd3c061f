use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Direct message between two accounts, optionally referencing a product.
/// Immutable once created; there is no read/unread state and no deletion.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub product_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub seq: i64,
}
