use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Closed set of account roles. Stored as the Postgres enum `user_role`;
/// authorization decisions dispatch over this exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Supplier,
}

/// Account profile. The id is assigned by the external identity service at
/// signup; this API reads and patches profiles but never creates or deletes
/// them.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub role: Role,
    pub full_name: String,
    pub phone: Option<String>,
    pub country: String,
    pub city: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}
