//! `SQLite` connection pool setup.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::StorageError;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the `SQLite` storage adapter.
#[derive(Debug, Clone)]
pub struct Config {
    /// `SQLite` connection URL (e.g. `sqlite:badger.db` or `sqlite::memory:`).
    pub database_url: String,
    /// Upper bound on pooled connections. In-memory databases always use one
    /// so that every statement sees the same data.
    pub max_connections: u32,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Config {
    /// Configuration for `database_url` with default pool settings.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Build a [`Database`] from this configuration.
    ///
    /// Creates the database file if missing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the URL is malformed or the connection fails.
    pub async fn build(self) -> Result<Database, StorageError> {
        let options = SqliteConnectOptions::from_str(&self.database_url)?
            .create_if_missing(true)
            .busy_timeout(self.busy_timeout);
        let pool_options = if is_in_memory(&self.database_url) {
            // The data lives as long as its single connection.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(self.max_connections.max(1))
        };
        let max_connections = pool_options.get_max_connections();

        let pool = pool_options.connect_with(options).await?;
        tracing::debug!(url = %self.database_url, max_connections, "sqlite pool ready");
        Ok(Database { pool })
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Holds the `SQLite` connection pool used by the database runner.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Borrow the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_detect_in_memory_urls() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite:file:shared?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite:badger.db?mode=rwc"));
    }

    #[tokio::test]
    async fn should_share_one_connection_for_memory_db() {
        let db = Config::new("sqlite::memory:").build().await.unwrap();
        assert_eq!(db.pool().options().get_max_connections(), 1);

        sqlx::query("CREATE TABLE syncs (event TEXT)")
            .execute(db.pool())
            .await
            .unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM syncs")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn should_create_database_file_when_missing() {
        let dir = std::env::temp_dir().join(format!("badger-pool-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("actions.db");

        let mut config = Config::new(format!("sqlite:{}", path.display()));
        config.max_connections = 2;
        let db = config.build().await.unwrap();

        assert!(path.exists());
        assert_eq!(db.pool().options().get_max_connections(), 2);
        db.pool().close().await;
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
