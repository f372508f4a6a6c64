use super::{CacheBackend, CacheError};
use async_trait::async_trait;
use log::error;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};

/// Redis-backed cache, lets several API replicas share fetched key sets
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    ttl_secs: u64,
}

impl RedisCache {
    /// Connects to Redis and verifies the server answers a PING
    pub async fn new(redis_url: &str, ttl_secs: u64) -> Result<Self, String> {
        let client =
            Client::open(redis_url).map_err(|e| format!("Invalid Redis URL {redis_url}: {e}"))?;
        let mut connection = ConnectionManager::new(client)
            .await
            .map_err(|e| format!("Failed to connect to Redis: {e}"))?;

        redis::cmd("PING")
            .query_async::<String>(&mut connection)
            .await
            .map_err(|e| format!("Failed to ping Redis: {e}"))?;

        Ok(Self {
            connection,
            ttl_secs,
        })
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), CacheError> {
        let serialized = serde_json::to_string(value)?;
        let mut connection = self.connection.clone();

        connection
            .set_ex::<_, _, ()>(key, serialized, self.ttl_secs)
            .await
            .map_err(|e| {
                error!("Redis error while setting key {}: {}", key, e);
                CacheError::Redis(e.to_string())
            })
    }

    async fn get<T: DeserializeOwned + Send + Sync>(
        &self,
        key: &str,
    ) -> Result<Option<T>, CacheError> {
        let mut connection = self.connection.clone();

        let value: Option<String> = connection.get(key).await.map_err(|e| {
            error!("Redis error while getting key {}: {}", key, e);
            CacheError::Redis(e.to_string())
        })?;

        value
            .map(|v| serde_json::from_str(&v).map_err(|e| CacheError::Deserialization(e.to_string())))
            .transpose()
    }

    async fn health_check(&self) -> Result<(), String> {
        let mut connection = self.connection.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut connection)
            .await
            .map(|_| ())
            .map_err(|e| format!("Redis health check failed: {e}"))
    }
}
