//! Configuration management
//!
//! All runtime settings live in an explicitly constructed [`Config`] loaded
//! once at startup and passed down. Nothing reads the environment after
//! `Config::load` returns.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/volta";

/// Default CORS allowed origin / frontend URL for local development.
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

/// Default Cache-Control max-age for catalog responses, in seconds.
pub const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 900;

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    /// Base URL of the hosted frontend, for rendering absolute links
    pub frontend_url: String,
    /// Cache lifetime applied to catalog (reference data) responses
    pub catalog_cache_ttl_secs: u64,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Connection pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// Cross-origin settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Read an environment variable, falling back to `default` when unset or
/// unparseable.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from the environment (including a `.env` file)
    /// and validate it.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .collect();

        let config = Config {
            server: ServerConfig {
                host: env_or("VOLTA_HOST", DEFAULT_SERVER_HOST.to_string()),
                port: env_or("VOLTA_PORT", DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_or(
                    "VOLTA_SHUTDOWN_TIMEOUT",
                    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                ),
            },
            database: DatabaseConfig {
                url: env_or("DATABASE_URL", DEFAULT_DATABASE_URL.to_string()),
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10),
                min_connections: env_or("DATABASE_MIN_CONNECTIONS", 2),
                connect_timeout_secs: env_or("DATABASE_CONNECT_TIMEOUT", 10),
                idle_timeout_secs: env_or("DATABASE_IDLE_TIMEOUT", 600),
            },
            cors: CorsConfig {
                allowed_origins,
                allow_credentials: env_or("CORS_ALLOW_CREDENTIALS", true),
            },
            frontend_url: env_or("VOLTA_FRONTEND_URL", DEFAULT_FRONTEND_URL.to_string()),
            catalog_cache_ttl_secs: env_or(
                "VOLTA_CATALOG_CACHE_TTL",
                DEFAULT_CATALOG_CACHE_TTL_SECS,
            ),
        };

        config.validate()?;

        Ok(config)
    }

    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }
        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }
        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }
        if self.frontend_url.is_empty() {
            anyhow::bail!("Frontend URL cannot be empty");
        }
        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: 10,
                min_connections: 2,
                connect_timeout_secs: 10,
                idle_timeout_secs: 600,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_FRONTEND_URL.to_string()],
                allow_credentials: true,
            },
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            catalog_cache_ttl_secs: DEFAULT_CATALOG_CACHE_TTL_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_pool_bounds_rejected() {
        let mut config = Config::default();
        config.database.min_connections = 50;
        config.database.max_connections = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_frontend_url_rejected() {
        let mut config = Config::default();
        config.frontend_url = String::new();
        assert!(config.validate().is_err());
    }
}
