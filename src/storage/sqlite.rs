// src/storage/sqlite.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use super::KeyValueBackend;

/// Primary storage backend: a key-value table in sqlite. Values are stored as
/// JSON text and must parse back; a corrupt row is an error, not a fallback.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create database directory")?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let store = Self::connect_url(&database_url).await?;

        info!("Sqlite storage ready: {}", database_url);
        Ok(store)
    }

    pub async fn connect_url(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to SQLite database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to run storage migration")?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueBackend for SqliteStore {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        let mut result = HashMap::new();

        for key in keys {
            let row: Option<String> =
                sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
                    .bind(key)
                    .fetch_optional(&self.pool)
                    .await
                    .with_context(|| format!("Failed to read key: {}", key))?;

            if let Some(text) = row {
                let value: Value = serde_json::from_str(&text)
                    .with_context(|| format!("Corrupt stored value for key: {}", key))?;
                result.insert(key.to_string(), value);
            }
        }

        Ok(result)
    }

    async fn set(&self, entries: HashMap<String, Value>) -> Result<()> {
        for (key, value) in entries {
            let text = serde_json::to_string(&value)
                .with_context(|| format!("Failed to serialize value for key: {}", key))?;

            sqlx::query(
                r#"
                INSERT INTO kv_store (key, value) VALUES (?, ?)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                "#,
            )
            .bind(&key)
            .bind(&text)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to write key: {}", key))?;
        }

        Ok(())
    }
}
