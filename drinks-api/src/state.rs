use crate::auth::TokenVerifier;
use crate::cache::{create_cache, Cache, CacheBackend};
use crate::config::AppConfig;
use crate::store::{create_store, DrinkRepository, DrinkStore};
use log::warn;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cache: Arc<Cache>,
    pub verifier: Arc<TokenVerifier>,
    pub store: Arc<DrinkStore>,
}

impl AppState {
    pub fn new(config: AppConfig, cache: Cache, store: DrinkStore) -> Result<Self, String> {
        let cache = Arc::new(cache);
        let verifier = TokenVerifier::new(&config.auth, cache.clone())?;

        Ok(Self {
            config: Arc::new(config),
            cache,
            verifier: Arc::new(verifier),
            store: Arc::new(store),
        })
    }

    /// Builds every component from configuration
    pub async fn from_config(config: AppConfig) -> Result<Self, String> {
        let cache = create_cache(&config)
            .await
            .map_err(|e| format!("Failed to initialize cache: {e}"))?;
        let store = create_store(&config)
            .await
            .map_err(|e| format!("Failed to initialize drink store: {e}"))?;
        Self::new(config, cache, store)
    }

    /// Checks the cache and the drink store, logging whichever fails
    pub async fn health_check(&self) -> Result<(), String> {
        let (cache, store) = tokio::join!(self.cache.health_check(), self.store.health_check());

        let issues: Vec<String> = [("cache", cache), ("store", store)]
            .into_iter()
            .filter_map(|(component, result)| result.err().map(|e| format!("{component}: {e}")))
            .collect();

        if issues.is_empty() {
            Ok(())
        } else {
            let message = issues.join(", ");
            warn!("Health check failed: {}", message);
            Err(message)
        }
    }

    #[cfg(test)]
    pub async fn for_testing(config: &AppConfig) -> Self {
        Self::from_config(config.clone())
            .await
            .expect("Failed to create test state")
    }
}
