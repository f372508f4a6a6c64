use crate::config::{AppConfig, DatabaseStore};
use crate::models::{Drink, DrinkChanges, Ingredient, NewDrink};
use thiserror::Error;

pub mod memory;
pub mod sqlite;

/// Errors that can occur while reading or writing drinks
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Drink {0} not found")]
    NotFound(i64),
    #[error("A drink titled '{0}' already exists")]
    DuplicateTitle(String),
    #[error("Stored recipe could not be decoded: {0}")]
    Corrupted(String),
    #[error("Failed to encode recipe: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create, read, update and delete operations on drinks.
///
/// Listing always returns drinks ordered by ascending id.
#[async_trait::async_trait]
pub trait DrinkRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Drink>, StoreError>;

    async fn insert(&self, drink: NewDrink) -> Result<Drink, StoreError>;

    /// Fails with [`StoreError::NotFound`] when no drink has the given id
    async fn update(&self, id: i64, changes: DrinkChanges) -> Result<Drink, StoreError>;

    /// Fails with [`StoreError::NotFound`] when no drink has the given id
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// Drops every drink and seeds the sample recipe
    async fn reset(&self) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), String>;
}

/// Drink storage selected at startup
#[derive(Clone)]
pub enum DrinkStore {
    /// SQLite table accessed through sqlx
    Sqlite(sqlite::SqliteDrinkStore),
    /// Process-local map, lost on restart
    InMemory(memory::InMemoryDrinkStore),
}

#[async_trait::async_trait]
impl DrinkRepository for DrinkStore {
    async fn list(&self) -> Result<Vec<Drink>, StoreError> {
        match self {
            Self::Sqlite(store) => store.list().await,
            Self::InMemory(store) => store.list().await,
        }
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, StoreError> {
        match self {
            Self::Sqlite(store) => store.insert(drink).await,
            Self::InMemory(store) => store.insert(drink).await,
        }
    }

    async fn update(&self, id: i64, changes: DrinkChanges) -> Result<Drink, StoreError> {
        match self {
            Self::Sqlite(store) => store.update(id, changes).await,
            Self::InMemory(store) => store.update(id, changes).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        match self {
            Self::Sqlite(store) => store.delete(id).await,
            Self::InMemory(store) => store.delete(id).await,
        }
    }

    async fn reset(&self) -> Result<(), StoreError> {
        match self {
            Self::Sqlite(store) => store.reset().await,
            Self::InMemory(store) => store.reset().await,
        }
    }

    async fn health_check(&self) -> Result<(), String> {
        match self {
            Self::Sqlite(store) => store.health_check().await,
            Self::InMemory(store) => store.health_check().await,
        }
    }
}

/// The drink every fresh database starts with
pub(crate) fn sample_drink() -> NewDrink {
    NewDrink {
        title: "water".to_string(),
        recipe: vec![Ingredient {
            color: "blue".to_string(),
            name: "water".to_string(),
            parts: 1,
        }],
    }
}

/// Creates the configured drink store, resetting it when requested
pub async fn create_store(config: &AppConfig) -> Result<DrinkStore, StoreError> {
    let store = match config.database.store {
        DatabaseStore::Sqlite => {
            DrinkStore::Sqlite(sqlite::SqliteDrinkStore::connect(&config.database.url).await?)
        }
        DatabaseStore::InMemory => DrinkStore::InMemory(memory::InMemoryDrinkStore::new()),
    };

    if config.database.reset {
        log::warn!("Resetting drink store, all existing drinks are dropped");
        store.reset().await?;
    }

    Ok(store)
}
