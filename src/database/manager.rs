use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config;

/// Errors surfaced by the storage layer.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Lazily-initialized connection pool for the application database.
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn pool() -> Result<PgPool, DatabaseError> {
        let pool = POOL
            .get_or_try_init(|| async {
                let url = std::env::var("DATABASE_URL")
                    .map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))?;
                let db = &config::config().database;

                let pool = PgPoolOptions::new()
                    .max_connections(db.max_connections)
                    .acquire_timeout(Duration::from_secs(db.connection_timeout))
                    .connect(&url)
                    .await?;

                info!("Created database pool (max_connections={})", db.max_connections);
                Ok::<_, DatabaseError>(pool)
            })
            .await?;
        Ok(pool.clone())
    }

    /// Apply pending SQL migrations at startup.
    pub async fn migrate() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| DatabaseError::Sqlx(sqlx::Error::Migrate(Box::new(e))))?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity.
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }
}

/// Map a unique-constraint violation to a distinct `Conflict` instead of
/// letting it surface as a generic query failure.
pub fn conflict_on_unique(err: sqlx::Error, what: &str) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            DatabaseError::Conflict(format!("{} already exists", what))
        }
        _ => DatabaseError::Sqlx(err),
    }
}
