use super::{sample_drink, DrinkRepository, StoreError};
use crate::models::{Drink, DrinkChanges, Ingredient, NewDrink};
use async_trait::async_trait;
use log::{debug, info};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS drink (
        id     INTEGER PRIMARY KEY AUTOINCREMENT,
        title  TEXT NOT NULL UNIQUE,
        recipe TEXT NOT NULL
    )
"#;

/// Drinks persisted in a SQLite table, recipes stored as JSON text
#[derive(Debug, Clone)]
pub struct SqliteDrinkStore {
    pool: SqlitePool,
}

impl SqliteDrinkStore {
    /// Opens (creating if needed) the database and ensures the table exists
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // Every connection to an in-memory database sees its own empty database
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let mut pool_options = SqlitePoolOptions::new();
        if in_memory {
            pool_options = pool_options
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        info!("Connected to drink database at {}", url);

        Ok(Self { pool })
    }

    #[cfg(test)]
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn decode_row(row: &SqliteRow) -> Result<Drink, StoreError> {
    let recipe: String = row.try_get("recipe")?;
    let recipe: Vec<Ingredient> =
        serde_json::from_str(&recipe).map_err(|e| StoreError::Corrupted(e.to_string()))?;

    Ok(Drink {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        recipe,
    })
}

fn write_error(err: sqlx::Error, title: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateTitle(title.to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl DrinkRepository for SqliteDrinkStore {
    async fn list(&self) -> Result<Vec<Drink>, StoreError> {
        let rows = sqlx::query("SELECT id, title, recipe FROM drink ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(decode_row).collect()
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, StoreError> {
        let recipe = serde_json::to_string(&drink.recipe)?;
        let result = sqlx::query("INSERT INTO drink (title, recipe) VALUES (?1, ?2)")
            .bind(&drink.title)
            .bind(&recipe)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(e, &drink.title))?;

        let id = result.last_insert_rowid();
        debug!("Inserted drink {} '{}'", id, drink.title);
        Ok(Drink {
            id,
            title: drink.title,
            recipe: drink.recipe,
        })
    }

    async fn update(&self, id: i64, changes: DrinkChanges) -> Result<Drink, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT id, title, recipe FROM drink WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let current = match row {
            Some(row) => decode_row(&row)?,
            None => return Err(StoreError::NotFound(id)),
        };

        let updated = changes.apply(current);
        let recipe = serde_json::to_string(&updated.recipe)?;
        sqlx::query("UPDATE drink SET title = ?1, recipe = ?2 WHERE id = ?3")
            .bind(&updated.title)
            .bind(&recipe)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error(e, &updated.title))?;

        tx.commit().await?;
        debug!("Updated drink {}", id);
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM drink WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        debug!("Deleted drink {}", id);
        Ok(())
    }

    async fn reset(&self) -> Result<(), StoreError> {
        sqlx::query("DROP TABLE IF EXISTS drink")
            .execute(&self.pool)
            .await?;
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        self.insert(sample_drink()).await.map(|_| ())
    }

    async fn health_check(&self) -> Result<(), String> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| format!("SQLite health check failed: {e}"))
    }
}
