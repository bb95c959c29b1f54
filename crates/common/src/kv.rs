//! Persisted-object store — typed get/set of JSON objects by key.
//!
//! The forum keeps small configuration objects (like the Telegram channel
//! config) in a key/value table. Values are whole JSON documents; a `set`
//! replaces the previous document for that key.

use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::PgPool;

use crate::error::AppError;

/// Typed access to the `kv_store` table.
pub struct KvStore;

impl KvStore {
    /// Fetch and deserialize the object stored under `key`.
    ///
    /// Returns `None` when the key is absent. A stored document that no
    /// longer matches `T` is a configuration error, not absence.
    pub async fn get<T: DeserializeOwned>(pool: &PgPool, key: &str) -> Result<Option<T>, AppError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT value FROM kv_store WHERE key = $1")
                .bind(key)
                .fetch_optional(pool)
                .await?;

        match row {
            Some((value,)) => {
                let parsed = serde_json::from_value(value).map_err(|e| {
                    AppError::Config(format!("Stored object '{}' is malformed: {}", key, e))
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Serialize `value` and store it under `key`, replacing any previous object.
    pub async fn set<T: Serialize>(pool: &PgPool, key: &str, value: &T) -> Result<(), AppError> {
        let json = serde_json::to_value(value)
            .map_err(|e| AppError::Internal(format!("Failed to serialize '{}': {}", key, e)))?;

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(&json)
        .execute(pool)
        .await?;

        tracing::debug!(key, "Stored object updated");
        Ok(())
    }
}
