// src/storage/mod.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

pub mod file;
pub mod sqlite;

pub use file::FileStore;
pub use sqlite::SqliteStore;

use crate::environment::EnvironmentConfig;

pub const KEY_EMAIL: &str = "email";
pub const KEY_RESUME_CONTENT: &str = "resumeContent";
pub const KEY_RESUME_NAME: &str = "resumeName";
pub const KEY_APPLICATIONS: &str = "applications";

/// Asynchronous key-value contract shared by both storage backends. Values are
/// opaque JSON; keys absent from the backend are omitted from the result map.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>>;
    async fn set(&self, entries: HashMap<String, Value>) -> Result<()>;
}

/// Pick a backend by capability: the sqlite store when its database can be
/// opened, else the file-per-key fallback.
pub async fn detect_backend(config: &EnvironmentConfig) -> Result<Box<dyn KeyValueBackend>> {
    match SqliteStore::connect(&config.database_path).await {
        Ok(store) => Ok(Box::new(store)),
        Err(e) => {
            warn!(
                "Sqlite storage unavailable ({}), falling back to file store at {}",
                e,
                config.storage_path.display()
            );
            Ok(Box::new(FileStore::open(&config.storage_path).await?))
        }
    }
}

/// The persisted user identity and resume. Overwritten on re-setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    pub resume_content: String,
    pub resume_name: String,
}

/// One recorded submission attempt. Append-only; duplicates permitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub company: String,
    pub job_role: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub url: String,
}

/// Profile and application-history access over a key-value backend.
pub struct ProfileStore {
    backend: Box<dyn KeyValueBackend>,
}

impl ProfileStore {
    pub fn new(backend: Box<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// Save the profile, resetting the application history to empty.
    pub async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        let mut entries = HashMap::new();
        entries.insert(KEY_EMAIL.to_string(), Value::String(profile.email.clone()));
        entries.insert(
            KEY_RESUME_CONTENT.to_string(),
            Value::String(profile.resume_content.clone()),
        );
        entries.insert(
            KEY_RESUME_NAME.to_string(),
            Value::String(profile.resume_name.clone()),
        );
        entries.insert(KEY_APPLICATIONS.to_string(), Value::Array(Vec::new()));

        self.backend.set(entries).await
    }

    /// Load the stored profile. Returns None when any of the three fields is
    /// missing or empty; the submission workflow treats that as "setup not
    /// done yet".
    pub async fn load_profile(&self) -> Result<Option<UserProfile>> {
        let values = self
            .backend
            .get(&[KEY_EMAIL, KEY_RESUME_CONTENT, KEY_RESUME_NAME])
            .await?;

        let email = stored_string(&values, KEY_EMAIL);
        let resume_content = stored_string(&values, KEY_RESUME_CONTENT);
        let resume_name = stored_string(&values, KEY_RESUME_NAME);

        if email.is_empty() || resume_content.is_empty() || resume_name.is_empty() {
            return Ok(None);
        }

        Ok(Some(UserProfile {
            email,
            resume_content,
            resume_name,
        }))
    }

    pub async fn load_applications(&self) -> Result<Vec<Application>> {
        let values = self.backend.get(&[KEY_APPLICATIONS]).await?;

        match values.get(KEY_APPLICATIONS) {
            Some(value) => serde_json::from_value(value.clone())
                .context("Stored application history is not a valid list"),
            None => Ok(Vec::new()),
        }
    }

    /// Append one application record and persist the full list, returning the
    /// refreshed history for display.
    pub async fn append_application(&self, application: Application) -> Result<Vec<Application>> {
        let mut applications = self.load_applications().await?;
        applications.push(application);

        let value = serde_json::to_value(&applications)
            .context("Failed to serialize application history")?;

        let mut entries = HashMap::new();
        entries.insert(KEY_APPLICATIONS.to_string(), value);
        self.backend.set(entries).await?;

        Ok(applications)
    }
}

// Renders a stored value as the string the caller works with. The fallback
// backend's speculative parse can hand back a non-string here (a numeric-
// looking email local part, say); its JSON rendering is used as-is rather
// than treating it as absent.
fn stored_string(values: &HashMap<String, Value>, key: &str) -> String {
    match values.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
