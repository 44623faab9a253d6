//! SQLite key-value store implementation.
//!
//! Implements `KvStore` from `squid-core` using sqlx with split read/write pools.
//! Plain strings are stored verbatim and everything else as JSON text; reads
//! decode JSON when the text parses and fall back to the raw string.

use chrono::Utc;
use serde_json::Value;
use sqlx::Row;
use squid_core::storage::kv_store::{KvStore, decode_value, encode_value};
use squid_types::error::RepositoryError;
use squid_types::storage::KvEntry;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_err};

/// SQLite-backed implementation of `KvStore`.
#[derive(Clone)]
pub struct SqliteKvStore {
    pool: DatabasePool,
}

impl SqliteKvStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct KvRow {
    key: String,
    value: String,
    updated_at: String,
}

impl KvRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            key: row.try_get("key")?,
            value: row.try_get("value")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_entry(self) -> Result<KvEntry, RepositoryError> {
        Ok(KvEntry {
            key: self.key,
            value: decode_value(self.value),
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// KvStore implementation
// ---------------------------------------------------------------------------

impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        match row {
            Some(row) => {
                let raw: String = row.try_get("value").map_err(query_err)?;
                Ok(Some(decode_value(raw)))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), RepositoryError> {
        let now = format_datetime(&Utc::now());
        let stored = encode_value(value)?;

        sqlx::query(
            r#"INSERT INTO kv (key, value, updated_at)
               VALUES (?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(&stored)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<KvEntry>, RepositoryError> {
        let rows = sqlx::query("SELECT key, value, updated_at FROM kv ORDER BY key")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_err)?;

        rows.iter()
            .map(|row| KvRow::from_row(row).map_err(query_err)?.into_entry())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_pool;
    use serde_json::json;

    #[tokio::test]
    async fn test_structured_value_roundtrip() {
        let store = SqliteKvStore::new(test_pool().await);

        let value = json!({"a": 1});
        store.set("prefs", &value).await.unwrap();

        assert_eq!(store.get("prefs").await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn test_plain_string_stored_verbatim() {
        let store = SqliteKvStore::new(test_pool().await);
        store.set("greeting", &json!("x")).await.unwrap();

        assert_eq!(store.get("greeting").await.unwrap(), Some(json!("x")));

        let raw: (String,) = sqlx::query_as("SELECT value FROM kv WHERE key = 'greeting'")
            .fetch_one(&store.pool.reader)
            .await
            .unwrap();
        assert_eq!(raw.0, "x");
    }

    #[tokio::test]
    async fn test_get_nonexistent_returns_none() {
        let store = SqliteKvStore::new(test_pool().await);
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_upserts() {
        let store = SqliteKvStore::new(test_pool().await);

        store.set("counter", &json!(1)).await.unwrap();
        store.set("counter", &json!({"n": 2})).await.unwrap();

        assert_eq!(store.get("counter").await.unwrap(), Some(json!({"n": 2})));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_and_delete_nonexistent() {
        let store = SqliteKvStore::new(test_pool().await);

        store.set("temp", &json!("value")).await.unwrap();
        store.delete("temp").await.unwrap();
        assert!(store.get("temp").await.unwrap().is_none());

        // Should not error
        store.delete("nope").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_ordered_by_key() {
        let store = SqliteKvStore::new(test_pool().await);
        store.set("beta", &json!("b")).await.unwrap();
        store.set("alpha", &json!([1, 2])).await.unwrap();

        let entries = store.list().await.unwrap();
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["alpha", "beta"]);
        assert_eq!(entries[0].value, json!([1, 2]));
    }
}
