// src/storage/file.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::KeyValueBackend;

/// Fallback backend: one file per key under a storage directory.
///
/// Writes always serialize to JSON text; reads parse speculatively and keep
/// the raw string when parsing fails. A raw string that happens to be valid
/// JSON therefore comes back as the parsed value, not the string — observable
/// behavior inherited from the storage contract, left as is.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub async fn open(root: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(root)
            .await
            .with_context(|| format!("Failed to create storage directory: {}", root.display()))?;

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl KeyValueBackend for FileStore {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        let mut result = HashMap::new();

        for key in keys {
            let path = self.key_path(key);
            match tokio::fs::read_to_string(&path).await {
                Ok(text) => {
                    let value = match serde_json::from_str::<Value>(&text) {
                        Ok(parsed) => parsed,
                        Err(_) => Value::String(text),
                    };
                    result.insert(key.to_string(), value);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to read storage file: {}", path.display()))
                }
            }
        }

        Ok(result)
    }

    async fn set(&self, entries: HashMap<String, Value>) -> Result<()> {
        for (key, value) in entries {
            let text = serde_json::to_string(&value)
                .with_context(|| format!("Failed to serialize value for key: {}", key))?;

            let path = self.key_path(&key);
            tokio::fs::write(&path, text)
                .await
                .with_context(|| format!("Failed to write storage file: {}", path.display()))?;
        }

        Ok(())
    }
}
