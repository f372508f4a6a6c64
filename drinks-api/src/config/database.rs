use confique::Config;
use serde::Deserialize;

/// Specifies where drinks are persisted
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DatabaseStore {
    Sqlite,
    InMemory,
}

/// Drink storage configuration
#[derive(Debug, Config, Clone)]
pub struct DatabaseConfig {
    /// Storage backend: "sqlite" (default) or "in-memory"
    #[config(env = "COFFEE_DATABASE_STORE", default = "sqlite")]
    pub store: DatabaseStore,

    /// SQLite connection string (default: sqlite://database.db)
    #[config(env = "COFFEE_DATABASE_URL", default = "sqlite://database.db")]
    pub url: String,

    /// Drop and recreate the drinks table on startup, seeding a sample drink
    #[config(env = "COFFEE_DATABASE_RESET", default = false)]
    pub reset: bool,
}
