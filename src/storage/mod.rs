//! Storage implementations.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::{StorageConfig, StorageType};

pub mod mock;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod schema;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod sql;

pub use crate::interfaces::ledger_store::{LedgerStore, Result, StorageError};
pub use mock::MockLedgerStore;

#[cfg(feature = "postgres")]
pub use sql::postgres::PostgresLedgerStore;
#[cfg(feature = "sqlite")]
pub use sql::sqlite::SqliteLedgerStore;

/// Initialize storage based on configuration.
///
/// Connects (retrying with backoff while the database comes up), creates the
/// ledger tables if needed, and returns the store behind the trait object the
/// reward engine consumes.
pub async fn init_storage(
    config: &StorageConfig,
) -> std::result::Result<Arc<dyn LedgerStore>, Box<dyn std::error::Error>> {
    match config.storage_type {
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            use backon::Retryable;
            use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

            info!(path = %config.sqlite.path, "Storage: sqlite");

            if let Some(parent) = std::path::Path::new(&config.sqlite.path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let options = SqliteConnectOptions::new()
                .filename(&config.sqlite.path)
                .journal_mode(SqliteJournalMode::Wal)
                .create_if_missing(true)
                .busy_timeout(config.timeout());

            let pool = (|| {
                SqlitePoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(config.timeout())
                    .connect_with(options.clone())
            })
            .retry(crate::utils::retry::connection_backoff())
            .notify(|e, delay| {
                tracing::warn!(error = %e, ?delay, "SQLite connection failed, retrying");
            })
            .await?;

            let store = SqliteLedgerStore::new(pool);
            store.init().await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageType::Sqlite => {
            error!("SQLite storage requested but 'sqlite' feature is not enabled");
            Err("SQLite feature not enabled".into())
        }
        #[cfg(feature = "postgres")]
        StorageType::Postgres => {
            use backon::Retryable;
            use sqlx::postgres::PgPoolOptions;

            info!("Storage: postgres");

            let pool = (|| {
                PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(config.timeout())
                    .connect(&config.postgres.uri)
            })
            .retry(crate::utils::retry::connection_backoff())
            .notify(|e, delay| {
                tracing::warn!(error = %e, ?delay, "PostgreSQL connection failed, retrying");
            })
            .await?;

            let store = PostgresLedgerStore::new(pool);
            store.init().await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres"))]
        StorageType::Postgres => {
            error!("PostgreSQL storage requested but 'postgres' feature is not enabled");
            Err("PostgreSQL feature not enabled".into())
        }
    }
}
