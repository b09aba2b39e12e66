//! Device-local storage for the session token

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::TokenError;

/// Key under which the token is kept in key-value storage
pub const TOKEN_KEY: &str = "auth_token";

/// Set/get/clear access to a single opaque session token
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn set(&self, token: &str) -> Result<(), TokenError>;
    async fn get(&self) -> Result<Option<String>, TokenError>;
    async fn clear(&self) -> Result<(), TokenError>;
}

/// Token store that lives only as long as the process
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn set(&self, token: &str) -> Result<(), TokenError> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn get(&self) -> Result<Option<String>, TokenError> {
        Ok(self.token.read().await.clone())
    }

    async fn clear(&self) -> Result<(), TokenError> {
        *self.token.write().await = None;
        Ok(())
    }
}

/// JSON key-value file on local disk.
///
/// Other keys present in the file are preserved on write.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<HashMap<String, String>, TokenError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                TokenError::Malformed(format!("{}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entries(&self, entries: &HashMap<String, String>) -> Result<(), TokenError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn set(&self, token: &str) -> Result<(), TokenError> {
        let mut entries = self.read_entries().await?;
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        self.write_entries(&entries).await?;
        tracing::debug!(path = %self.path.display(), "Session token stored");
        Ok(())
    }

    async fn get(&self) -> Result<Option<String>, TokenError> {
        Ok(self.read_entries().await?.remove(TOKEN_KEY))
    }

    async fn clear(&self) -> Result<(), TokenError> {
        let mut entries = self.read_entries().await?;
        if entries.remove(TOKEN_KEY).is_some() {
            self.write_entries(&entries).await?;
            tracing::debug!(path = %self.path.display(), "Session token cleared");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("loanbook-test-{}", Uuid::new_v4()))
            .join("token.json")
    }

    #[tokio::test]
    async fn test_memory_store_set_get_clear() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get().await.unwrap(), None);

        store.set("abc").await.unwrap();
        assert_eq!(store.get().await.unwrap().as_deref(), Some("abc"));

        store.clear().await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_roundtrip_and_missing_file() {
        let path = temp_path();
        let store = FileTokenStore::new(&path);
        assert_eq!(store.get().await.unwrap(), None);

        store.set("token-1").await.unwrap();
        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.get().await.unwrap().as_deref(), Some("token-1"));

        reopened.clear().await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_file_store_keeps_other_keys() {
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"locale":"sw-KE"}"#).unwrap();

        let store = FileTokenStore::new(&path);
        store.set("token-2").await.unwrap();
        store.clear().await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("sw-KE"));
        assert!(!raw.contains("token-2"));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_file_store_rejects_corrupt_file() {
        let path = temp_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let store = FileTokenStore::new(&path);
        assert!(matches!(store.get().await, Err(TokenError::Malformed(_))));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
