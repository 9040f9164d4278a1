//! SQLite connection management.

use std::str::FromStr;

use serde::Deserialize;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

/// Configuration for connecting to SQLite.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Connection URL (e.g., `sqlite://procura.db` or `sqlite::memory:`).
    pub url: String,
    /// Upper bound on pooled connections. In-memory databases always use
    /// a single connection so every caller sees the same data.
    pub max_connections: u32,
}

impl DbConfig {
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".into(),
            max_connections: 1,
        }
    }

    pub fn is_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://procura.db".into(),
            max_connections: 5,
        }
    }
}

/// Manages a pool of SQLite connections.
#[derive(Clone)]
pub struct DbManager {
    pool: SqlitePool,
}

impl DbManager {
    /// Open the configured database, creating the file if needed.
    pub async fn connect(config: &DbConfig) -> Result<Self, sqlx::Error> {
        info!(url = %config.url, "Connecting to SQLite");

        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if config.is_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = pool_options.connect_with(options).await?;

        info!("Successfully connected to SQLite");

        Ok(Self { pool })
    }

    /// Returns a handle to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all pooled connections.
    pub async fn shutdown(&self) {
        info!("Closing database connections");
        self.pool.close().await;
    }
}
