use confique::Config;
use serde::Deserialize;

/// Specifies which cache store holds fetched key sets
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CacheStore {
    InMemory,
    Redis,
    None,
}

/// Configuration for the key set cache
#[derive(Debug, Config, Clone)]
pub struct CacheConfig {
    /// How long a fetched key set is trusted, in seconds (default: 10 minutes)
    #[config(env = "COFFEE_CACHE_TTL", default = 600)]
    pub ttl: u64,

    /// Cache store type: "in-memory" (default), "redis" or "none"
    #[config(env = "COFFEE_CACHE_STORE", default = "in-memory")]
    pub store: CacheStore,

    /// In-memory cache capacity in MiB (default: 16)
    #[config(env = "COFFEE_CACHE_MEMORY_CAPACITY", default = 16)]
    pub memory_capacity: usize,

    /// Redis connection string, required for the redis store
    #[config(env = "COFFEE_CACHE_REDIS_URL", default = "")]
    pub redis_url: String,
}
