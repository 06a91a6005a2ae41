use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::{DatabaseBackend, DatabaseConfig};

use super::executor::QueryExecutor;
use super::memory::MemoryExecutor;
use super::postgres::PgExecutor;

/// Errors raised while running a listing against a store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Build the executor selected by configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn QueryExecutor>, DatabaseError> {
    match config.backend {
        DatabaseBackend::Memory => {
            info!("Using in-memory store seeded from bundled fixtures");
            Ok(Arc::new(MemoryExecutor::with_fixtures()?))
        }
        DatabaseBackend::Postgres => {
            let url = config.url.as_deref().ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
            let pool = create_pool(url, config).await?;
            info!("Connected to PostgreSQL (max_connections={})", config.max_connections);
            Ok(Arc::new(PgExecutor::new(pool)))
        }
    }
}

async fn create_pool(url: &str, config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect(url)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))
}
