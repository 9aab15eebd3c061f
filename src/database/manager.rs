use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use crate::config;
use crate::database::StoreError;

/// Build the single process-wide connection pool from DATABASE_URL.
///
/// Connections are established lazily so the process can boot while the
/// store is briefly unreachable; /health reports degraded until it recovers.
/// The pool is created once at startup, handed to components through axum
/// state, and closed on shutdown; nothing reconstructs connections per call.
pub fn connect() -> Result<PgPool, StoreError> {
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| StoreError::ConfigMissing("DATABASE_URL"))?;

    let db_config = &config::config().database;
    let pool = PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .acquire_timeout(Duration::from_secs(db_config.connection_timeout_secs))
        .connect_lazy(&database_url)?;

    info!("Created database pool (max_connections={})", db_config.max_connections);
    Ok(pool)
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Close the pool (on shutdown)
pub async fn close(pool: &PgPool) {
    pool.close().await;
    info!("Closed database pool");
}
