use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Unique (product, user) pairing; created and destroyed by the like toggle.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductLike {
    pub product_id: Uuid,
    pub user_id: Uuid,
}
