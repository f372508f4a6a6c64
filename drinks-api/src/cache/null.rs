use super::{CacheBackend, CacheError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// Cache that forgets everything, so every key set lookup goes to the network
#[derive(Clone, Debug, Default)]
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        NullCache
    }
}

#[async_trait]
impl CacheBackend for NullCache {
    async fn set<T: Serialize + Send + Sync>(
        &self,
        _key: &str,
        _value: &T,
    ) -> Result<(), CacheError> {
        Ok(())
    }

    async fn get<T: DeserializeOwned + Send + Sync>(
        &self,
        _key: &str,
    ) -> Result<Option<T>, CacheError> {
        Ok(None)
    }

    async fn health_check(&self) -> Result<(), String> {
        Ok(())
    }
}
