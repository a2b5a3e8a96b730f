//! Database client and connection management

use crate::schema::SCHEMA;
use crate::{DbError, DbResult};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

/// Database client wrapping the sqlx connection pool.
///
/// Created once at startup and shared by reference; [`DbClient::close`]
/// drains the pool on shutdown.
#[derive(Clone)]
pub struct DbClient {
    pool: PgPool,
}

/// Pool sizing
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

impl DbClient {
    /// Create a new database client from connection string
    pub async fn new(database_url: &str) -> DbResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(PoolSettings::default().max_connections)
            .acquire_timeout(PoolSettings::default().acquire_timeout)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new database client with custom options
    pub async fn with_options(opts: PgConnectOptions, settings: PoolSettings) -> DbResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_with(opts)
            .await?;

        Ok(Self { pool })
    }

    /// Get reference to underlying pool for direct queries
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Test the database connection
    pub async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Create tables and indexes that do not exist yet
    pub async fn ensure_schema(&self) -> DbResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(DbError::classify)?;
        }
        info!("Database schema verified");
        Ok(())
    }

    /// Close the connection pool gracefully
    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// Build PostgreSQL connection options from components
pub struct DbConnectionBuilder {
    host: String,
    port: u16,
    database: String,
    username: String,
    password: Option<String>,
    schema: Option<String>,
}

impl DbConnectionBuilder {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: database.into(),
            username: "postgres".to_string(),
            password: None,
            schema: None,
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Schema put on the `search_path` of every pooled connection
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn validate(&self) -> DbResult<()> {
        if self.host.is_empty() {
            return Err(DbError::ConfigError("database host is empty".to_string()));
        }
        if self.database.is_empty() {
            return Err(DbError::ConfigError("database name is empty".to_string()));
        }
        Ok(())
    }

    pub fn build(self) -> DbResult<PgConnectOptions> {
        self.validate()?;

        let mut opts = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username);

        if let Some(password) = self.password {
            opts = opts.password(&password);
        }
        if let Some(schema) = self.schema {
            opts = opts.options([("search_path", schema.as_str())]);
        }

        Ok(opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_builder() {
        let opts = DbConnectionBuilder::new("wsp")
            .host("db.example.com")
            .port(5433)
            .username("admin")
            .password("p@ss:word/")
            .schema("sensors")
            .build()
            .unwrap();

        assert_eq!(opts.get_host(), "db.example.com");
        assert_eq!(opts.get_port(), 5433);
        assert_eq!(opts.get_username(), "admin");
        assert_eq!(opts.get_database(), Some("wsp"));
    }

    #[test]
    fn test_connection_builder_rejects_empty_database() {
        let result = DbConnectionBuilder::new("").build();
        assert!(matches!(result, Err(DbError::ConfigError(_))));
    }
}
