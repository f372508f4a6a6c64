pub(crate) use crate::config::auth::AuthConfig;
pub(crate) use crate::config::cache::{CacheConfig, CacheStore};
pub(crate) use crate::config::database::{DatabaseConfig, DatabaseStore};
use confique::Config;
use std::path::Path;

pub mod auth;
pub mod cache;
pub mod database;

/// Optional configuration file read after the environment
pub const DEFAULT_CONFIG_FILE: &str = "coffee-shop.toml";

/// Main configuration structure for the drinks API
#[derive(Debug, Config, Clone)]
pub struct AppConfig {
    /// The port the server will listen to (default: 5000)
    #[config(env = "COFFEE_PORT", default = 5000)]
    pub port: u16,

    /// Value of the Access-Control-Allow-Origin header (default: *)
    #[config(env = "COFFEE_CORS_ALLOW_ORIGIN", default = "*")]
    pub cors_allow_origin: String,

    /// Token verification configuration
    #[config(nested)]
    pub auth: AuthConfig,

    /// Key set cache configuration
    #[config(nested)]
    pub cache: CacheConfig,

    /// Drink storage configuration
    #[config(nested)]
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Loads the configuration from environment variables and the default file
    pub fn new() -> Result<Self, String> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Loads the configuration from environment variables, then the given file.
    ///
    /// Environment variables win over file values; a missing file is skipped.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, String> {
        let config = Self::builder()
            .env()
            .file(path.as_ref())
            .load()
            .map_err(|e| format!("{e:#}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values confique cannot express as types
    pub fn validate(&self) -> Result<(), String> {
        if self.auth.domain.trim().is_empty() {
            return Err("auth domain must not be empty".to_string());
        }
        if self.auth.audience.trim().is_empty() {
            return Err("auth audience must not be empty".to_string());
        }
        self.auth.algorithms()?;
        if self.auth.jwks_timeout == 0 {
            return Err("JWKS timeout must be at least one second".to_string());
        }
        if self.cache.store == CacheStore::Redis && self.cache.redis_url.is_empty() {
            return Err("Redis URL is required for the redis cache store".to_string());
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn for_test_with_mocks(jwks_mock: &wiremock::MockServer) -> Self {
        Self {
            port: 0, // Let the OS choose a port
            cors_allow_origin: "*".to_string(),
            auth: AuthConfig {
                domain: "coffee-shop.test".to_string(),
                audience: "drinks".to_string(),
                algorithms: "RS256".to_string(),
                // Use the mock server address for the key set
                jwks_url: Some(format!("{}/.well-known/jwks.json", jwks_mock.uri())),
                issuer: None,
                jwks_timeout: 2,
            },
            cache: CacheConfig {
                ttl: 60,
                store: CacheStore::None,
                memory_capacity: 1,
                redis_url: String::new(),
            },
            database: DatabaseConfig {
                store: DatabaseStore::InMemory,
                url: "sqlite::memory:".to_string(),
                reset: false,
            },
        }
    }
}
