//! Database collaborator: the shared Postgres pool and the queries run against it.

pub mod users;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::AppError;

const MAX_CONNECTIONS: u32 = 5;

/// Opens the connection pool shared by every worker.
pub async fn connect(database_url: &str) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await?;
    log::info!("Connected to database (max {} connections)", MAX_CONNECTIONS);
    Ok(pool)
}

/// Applies the embedded migrations under `migrations/`.
pub async fn migrate(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Migration failed: {}", e)))
}
