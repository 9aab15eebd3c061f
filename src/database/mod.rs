pub mod manager;
pub mod models;
pub mod query;
pub mod repository;

use thiserror::Error;

/// Errors from the record store boundary
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub use query::{Condition, Query, SortDirection, SqlParam};
pub use repository::Repository;
