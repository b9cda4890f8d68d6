pub mod models;
pub mod todos;
pub mod users;

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub use todos::{PgTodoStore, TodoStore};
pub use users::{PgUserStore, UserStore};

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("migration failed: {0}")]
    Migration(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Open the connection pool and bring the schema up to date.
pub async fn connect(database_url: &str) -> Result<PgPool, StoreError> {
    let db_config = &crate::config::config().database;

    let pool = PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .acquire_timeout(Duration::from_secs(db_config.connection_timeout))
        .connect(database_url)
        .await?;

    MIGRATOR
        .run(&pool)
        .await
        .map_err(|e| StoreError::Migration(e.to_string()))?;

    info!("Database pool ready ({} max connections)", db_config.max_connections);
    Ok(pool)
}
