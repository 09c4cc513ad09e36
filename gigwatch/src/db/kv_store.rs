//! Key-value document access
//!
//! Values are JSON documents; writes are upserts.

use gigwatch_common::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Pool, Sqlite};

/// Read and decode the document stored under `key`
///
/// Returns `None` when the key has never been written.
pub async fn get_document<T: DeserializeOwned>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await
        .map_err(Error::Database)?;

    match row {
        Some((value,)) => Ok(Some(serde_json::from_str(&value)?)),
        None => Ok(None),
    }
}

/// Encode `value` and store it under `key`, replacing any previous document
pub async fn set_document<T: Serialize + ?Sized>(db: &Pool<Sqlite>, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;

    sqlx::query(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )
    .bind(key)
    .bind(json)
    .bind(gigwatch_common::time::now().to_rfc3339())
    .execute(db)
    .await
    .map_err(Error::Database)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_pool;

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let pool = init_memory_pool().await.unwrap();
        let value: Option<Vec<String>> = get_document(&pool, "nothing").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let pool = init_memory_pool().await.unwrap();
        set_document(&pool, "names", &vec!["Low", "Slowdive"]).await.unwrap();

        let value: Option<Vec<String>> = get_document(&pool, "names").await.unwrap();
        assert_eq!(value, Some(vec!["Low".to_string(), "Slowdive".to_string()]));
    }

    #[tokio::test]
    async fn test_set_replaces_without_duplicates() {
        let pool = init_memory_pool().await.unwrap();
        set_document(&pool, "names", &["old"]).await.unwrap();
        set_document(&pool, "names", &["new"]).await.unwrap();

        let value: Option<Vec<String>> = get_document(&pool, "names").await.unwrap();
        assert_eq!(value, Some(vec!["new".to_string()]));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_store WHERE key = 'names'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1, "Should have exactly one entry after update");
    }

    #[tokio::test]
    async fn test_corrupt_document_is_serialization_error() {
        let pool = init_memory_pool().await.unwrap();
        sqlx::query("INSERT INTO kv_store (key, value, updated_at) VALUES ('names', 'not json', '')")
            .execute(&pool)
            .await
            .unwrap();

        let result: Result<Option<Vec<String>>> = get_document(&pool, "names").await;
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
