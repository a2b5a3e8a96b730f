//! Wiring shared by the `wspd` server and the `wsp-seed` tool

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use wsp_api::AuthSettings;
use wsp_config::{AuthConfig, DatabaseConfig};
use wsp_db::{DbClient, DbConnectionBuilder, PoolSettings};

/// Open the connection pool, verify it answers and create missing tables
pub async fn connect(config: &DatabaseConfig) -> Result<DbClient> {
    let mut builder = DbConnectionBuilder::new(config.name.clone())
        .host(config.host.clone())
        .port(config.port)
        .username(config.user.clone())
        .password(config.password.clone());
    if let Some(schema) = &config.schema {
        builder = builder.schema(schema.clone());
    }
    let options = builder.build().context("Invalid database settings")?;

    let settings = PoolSettings {
        max_connections: config.max_connections,
        acquire_timeout: Duration::from_secs(config.acquire_timeout_secs),
    };
    let db = DbClient::with_options(options, settings)
        .await
        .context("Failed to connect to database")?;
    info!(host = %config.host, port = config.port, database = %config.name, "Connected to database");

    db.ping().await.context("Database ping failed")?;
    db.ensure_schema()
        .await
        .context("Failed to create database schema")?;

    Ok(db)
}

pub fn auth_settings(config: &AuthConfig) -> AuthSettings {
    AuthSettings {
        jwt_secret: config.jwt_secret.clone(),
        token_ttl_secs: config.token_ttl_secs,
        hash_cost: config.hash_cost,
    }
}
