use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Product listing owned by a supplier.
///
/// `supplier_country`/`supplier_city` are a snapshot of the owner's location
/// taken at creation time; they do not track later profile changes.
/// `likes_count` equals the number of rows in `product_likes` for this
/// product between operations.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image_base64: Option<String>,
    pub stock_quantity: i32,
    pub likes_count: i32,
    pub supplier_country: Option<String>,
    pub supplier_city: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Insertion order tie-breaker for created_at sorts; not part of the API.
    #[serde(skip_serializing)]
    pub seq: i64,
}
