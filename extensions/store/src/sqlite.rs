//! SQLite backend (feature `sqlite`).

use async_trait::async_trait;
use legacy_clock_core::capability::KeyValueStore;
use legacy_clock_core::error::StoreError;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS legacy_clock_kv (
    key   TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)";

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// A single-table key-value store.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to `url` (e.g. `sqlite://wills.db?mode=rwc` or `sqlite::memory:`)
    /// and make sure the table exists.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        // In-memory databases are per connection: keep a single one.
        let max = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max)
            .connect(url)
            .await
            .map_err(backend)?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(backend)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        sqlx::query_scalar::<_, String>("SELECT value FROM legacy_clock_kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO legacy_clock_kv (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM legacy_clock_kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_and_remove() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();

        assert_eq!(store.get("checkin:0xa").await.unwrap(), None);
        store.set("checkin:0xa", "1".to_string()).await.unwrap();
        store.set("checkin:0xa", "2".to_string()).await.unwrap();
        assert_eq!(store.get("checkin:0xa").await.unwrap().as_deref(), Some("2"));

        store.remove("checkin:0xa").await.unwrap();
        store.remove("checkin:0xa").await.unwrap();
        assert_eq!(store.get("checkin:0xa").await.unwrap(), None);
    }
}
