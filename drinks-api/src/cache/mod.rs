use crate::config::{AppConfig, CacheStore};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub mod memory;
pub mod null;
pub mod redis;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to serialize value: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to parse value: {0}")]
    Deserialization(String),
    #[error("Redis error: {0}")]
    Redis(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Contract shared by every cache backend.
///
/// Values are stored as JSON and expire after the backend's TTL.
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    /// Store a value under `key`, replacing any previous one
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T)
        -> Result<(), CacheError>;

    /// Retrieve a value, `None` when absent or expired
    async fn get<T: DeserializeOwned + Send + Sync>(
        &self,
        key: &str,
    ) -> Result<Option<T>, CacheError>;

    /// Verifies the backend can serve requests
    async fn health_check(&self) -> Result<(), String>;
}

/// Cache backend chosen from configuration at startup
#[derive(Clone)]
pub enum Cache {
    /// Process-local cache backed by Moka
    InMemory(memory::InMemoryCache),
    /// Cache shared between replicas through Redis
    Redis(redis::RedisCache),
    /// Never stores anything, every lookup misses
    Null(null::NullCache),
}

impl Cache {
    /// Name of the backend, used in logs and readiness output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InMemory(_) => "in-memory",
            Self::Redis(_) => "redis",
            Self::Null(_) => "none",
        }
    }
}

#[async_trait::async_trait]
impl CacheBackend for Cache {
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), CacheError> {
        match self {
            Self::InMemory(cache) => cache.set(key, value).await,
            Self::Redis(cache) => cache.set(key, value).await,
            Self::Null(cache) => cache.set(key, value).await,
        }
    }

    async fn get<T: DeserializeOwned + Send + Sync>(
        &self,
        key: &str,
    ) -> Result<Option<T>, CacheError> {
        match self {
            Self::InMemory(cache) => cache.get(key).await,
            Self::Redis(cache) => cache.get(key).await,
            Self::Null(cache) => cache.get(key).await,
        }
    }

    async fn health_check(&self) -> Result<(), String> {
        match self {
            Self::InMemory(cache) => cache.health_check().await,
            Self::Redis(cache) => cache.health_check().await,
            Self::Null(cache) => cache.health_check().await,
        }
    }
}

/// Builds the cache selected by `cache.store`
pub async fn create_cache(config: &AppConfig) -> Result<Cache, CacheError> {
    let ttl = config.cache.ttl;
    match config.cache.store {
        CacheStore::InMemory => {
            let cache = memory::InMemoryCache::new(ttl, config.cache.memory_capacity)
                .map_err(CacheError::Config)?;
            Ok(Cache::InMemory(cache))
        }
        CacheStore::Redis => {
            if config.cache.redis_url.is_empty() {
                return Err(CacheError::Config(
                    "Redis URL is required for Redis cache".to_string(),
                ));
            }
            let cache = redis::RedisCache::new(&config.cache.redis_url, ttl)
                .await
                .map_err(CacheError::Config)?;
            Ok(Cache::Redis(cache))
        }
        CacheStore::None => Ok(Cache::Null(null::NullCache::new())),
    }
}
