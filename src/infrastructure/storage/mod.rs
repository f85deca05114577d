//! File-based session storage

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::application::errors::StorageError;

const CREDENTIALS_FILE: &str = "creds.json";

/// Credentials persisted between restarts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub instance: String,
    pub credentials: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// JSON file store for one session directory
pub struct SessionStore {
    base_path: PathBuf,
}

impl SessionStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub async fn init(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.base_path
    }

    fn credentials_path(&self) -> PathBuf {
        self.base_path.join(CREDENTIALS_FILE)
    }

    /// Stored credentials, or `None` on first start
    pub async fn load_credentials(&self) -> Result<Option<StoredCredentials>, StorageError> {
        let content = match tokio::fs::read_to_string(self.credentials_path()).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_str(&content)?))
    }

    pub async fn save_credentials(&self, instance: &str, credentials: &str) -> Result<(), StorageError> {
        self.init().await?;
        let stored = StoredCredentials {
            instance: instance.to_string(),
            credentials: credentials.to_string(),
            updated_at: chrono::Utc::now(),
        };
        let content = serde_json::to_string_pretty(&stored)?;

        // Write then rename so a crash never leaves a half-written file
        let tmp = self.base_path.join(format!("{}.tmp", CREDENTIALS_FILE));
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, self.credentials_path()).await?;
        tracing::debug!("Session credentials saved to {}", self.credentials_path().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sila-bot-{}-{}", name, uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_missing_credentials() {
        let store = SessionStore::new(temp_dir("missing"));
        assert!(store.load_credentials().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_credentials() {
        let dir = temp_dir("roundtrip");
        let store = SessionStore::new(&dir);
        store.save_credentials("sila-bot", "token-1").await.unwrap();
        store.save_credentials("sila-bot", "token-2").await.unwrap();

        let stored = store.load_credentials().await.unwrap().unwrap();
        assert_eq!(stored.credentials, "token-2");
        assert_eq!(stored.instance, "sila-bot");
        assert!(!dir.join("creds.json.tmp").exists());
        let _ = std::fs::remove_dir_all(dir);
    }
}
