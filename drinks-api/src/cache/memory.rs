use super::{CacheBackend, CacheError};
use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Moka-backed cache; entries are weighted by their serialized size
#[derive(Clone)]
pub struct InMemoryCache {
    entries: MokaCache<String, String>,
}

impl InMemoryCache {
    /// Creates a cache holding at most `capacity_mib` MiB of JSON for `ttl_secs` seconds
    pub fn new(ttl_secs: u64, capacity_mib: usize) -> Result<Self, String> {
        let max_bytes = capacity_mib
            .checked_mul(1024 * 1024)
            .and_then(|bytes| u64::try_from(bytes).ok())
            .ok_or_else(|| format!("Cache capacity of {capacity_mib} MiB is too large"))?;

        let entries = MokaCache::builder()
            .time_to_live(Duration::from_secs(ttl_secs))
            .weigher(|key: &String, value: &String| -> u32 {
                (key.len() + value.len()).try_into().unwrap_or(u32::MAX)
            })
            .max_capacity(max_bytes)
            .build();

        Ok(Self { entries })
    }
}

#[async_trait]
impl CacheBackend for InMemoryCache {
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), CacheError> {
        let serialized = serde_json::to_string(value)?;
        self.entries.insert(key.to_string(), serialized).await;
        Ok(())
    }

    async fn get<T: DeserializeOwned + Send + Sync>(
        &self,
        key: &str,
    ) -> Result<Option<T>, CacheError> {
        match self.entries.get(key).await {
            Some(value) => serde_json::from_str(&value)
                .map(Some)
                .map_err(|e| CacheError::Deserialization(e.to_string())),
            None => Ok(None),
        }
    }

    async fn health_check(&self) -> Result<(), String> {
        Ok(())
    }
}
