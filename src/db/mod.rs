use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, StoreBackend};

pub mod memory;
pub mod queries;
pub mod repository;

pub use memory::InMemoryJobRepository;
pub use queries::SqliteJobRepository;
pub use repository::{JobRepository, StoreError};

/// Initialize SQLite connection pool
///
/// In-memory URLs get a single long-lived connection, otherwise every pooled
/// connection would see its own empty database.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let in_memory = database_url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(10));
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
    };

    pool_options.connect_with(options).await
}

/// Run database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| sqlx::Error::Migrate(Box::new(e)))
}

/// Build the job store selected by `STORE_BACKEND`.
pub async fn open_repository(config: &AppConfig) -> Result<Arc<dyn JobRepository>, StoreError> {
    match config.store_backend {
        StoreBackend::Sqlite => {
            tracing::info!(database_url = %config.database_url, "Opening SQLite job store");
            let pool = init_pool(&config.database_url).await?;
            run_migrations(&pool).await?;
            Ok(Arc::new(SqliteJobRepository::new(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory job store; jobs are lost on restart");
            Ok(Arc::new(InMemoryJobRepository::new()))
        }
    }
}
