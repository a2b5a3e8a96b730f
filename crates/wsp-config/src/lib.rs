use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub schema: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "postgres".to_string(),
            user: "postgres".to_string(),
            password: "123456".to_string(),
            schema: None,
            max_connections: 10,
            acquire_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub hash_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "123456".to_string(),
            token_ttl_secs: 86_400,
            hash_cost: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when RUST_LOG is unset
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub log: LogConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv { name: String, value: String },
}

fn parse_env<T: std::str::FromStr>(name: &str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnv {
            name: name.to_string(),
            value,
        })
}

impl AppConfig {
    /// Load configuration from WSP_CONFIG path (TOML) if present, then apply
    /// environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("WSP_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        let mut cfg = Self::from_file(&path)?;
        cfg.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(cfg)
    }

    /// Parse a TOML file; a missing file yields the defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let s = fs::read_to_string(path)?;
        Ok(toml::from_str::<AppConfig>(&s)?)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("WSP_BIND") {
            self.server.bind = bind;
        } else if let Some(port) = lookup("PORT") {
            let port: u16 = parse_env("PORT", port)?;
            let host = self
                .server
                .bind
                .rsplit_once(':')
                .map_or("0.0.0.0", |(host, _)| host)
                .to_string();
            self.server.bind = format!("{host}:{port}");
        }

        if let Some(host) = lookup("DATABASE_HOST") {
            self.database.host = host;
        }
        if let Some(port) = lookup("DATABASE_PORT") {
            self.database.port = parse_env("DATABASE_PORT", port)?;
        }
        if let Some(name) = lookup("DATABASE_NAME") {
            self.database.name = name;
        }
        if let Some(user) = lookup("DATABASE_USER") {
            self.database.user = user;
        }
        if let Some(password) = lookup("DATABASE_PASSWORD") {
            self.database.password = password;
        }
        if let Some(schema) = lookup("DATABASE_SCHEMA") {
            self.database.schema = Some(schema).filter(|s| !s.is_empty());
        }

        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(ttl) = lookup("JWT_EXPIRATION_SECS") {
            self.auth.token_ttl_secs = parse_env("JWT_EXPIRATION_SECS", ttl)?;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            self.log.level = level;
        }
        if let Some(json) = lookup("LOG_JSON") {
            self.log.json = parse_env("LOG_JSON", json)?;
        }

        Ok(())
    }

    /// HTTP bind address (default 0.0.0.0:8080)
    pub fn http_bind(&self) -> &str {
        &self.server.bind
    }
}
