use super::{sample_drink, DrinkRepository, StoreError};
use crate::models::{Drink, DrinkChanges, NewDrink};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Table {
    rows: BTreeMap<i64, Drink>,
    last_id: i64,
}

impl Table {
    fn title_taken(&self, title: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|drink| drink.title == title && Some(drink.id) != except)
    }
}

/// Keeps drinks in a process-local ordered map
#[derive(Clone, Default)]
pub struct InMemoryDrinkStore {
    table: Arc<RwLock<Table>>,
}

impl InMemoryDrinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DrinkRepository for InMemoryDrinkStore {
    async fn list(&self) -> Result<Vec<Drink>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, StoreError> {
        let mut table = self.table.write().await;
        if table.title_taken(&drink.title, None) {
            return Err(StoreError::DuplicateTitle(drink.title));
        }

        table.last_id += 1;
        let drink = Drink {
            id: table.last_id,
            title: drink.title,
            recipe: drink.recipe,
        };
        table.rows.insert(drink.id, drink.clone());
        Ok(drink)
    }

    async fn update(&self, id: i64, changes: DrinkChanges) -> Result<Drink, StoreError> {
        let mut table = self.table.write().await;
        let current = table.rows.get(&id).cloned().ok_or(StoreError::NotFound(id))?;

        let updated = changes.apply(current);
        if table.title_taken(&updated.title, Some(id)) {
            return Err(StoreError::DuplicateTitle(updated.title));
        }
        table.rows.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        table
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn reset(&self) -> Result<(), StoreError> {
        {
            let mut table = self.table.write().await;
            *table = Table::default();
        }
        self.insert(sample_drink()).await.map(|_| ())
    }

    async fn health_check(&self) -> Result<(), String> {
        Ok(())
    }
}
