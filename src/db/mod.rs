//! Database connection pool, read-side repository, and the write-side
//! Persistence Gateway.

pub mod gateway;
pub mod repository;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates the shared PostgreSQL connection pool. Schema management is out
/// of scope for this service — the six catalog/query tables are assumed
/// to already exist, owned by the system that provisions them.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await?;

    info!("Connected to PostgreSQL");
    Ok(pool)
}
