//! Local on-disk cache of downloaded messages.
//!
//! Messages live at `{base}/{user}/{mailbox}/{uid}.eml`. The caching rule is
//! a single branch: read the file when it exists, otherwise the caller
//! fetches and saves it. No locking, no invalidation.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
#[error("message store I/O error at {}: {source}", .path.display())]
pub struct StoreError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl StoreError {
    fn new(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}

/// Per-user, per-mailbox message directory.
#[derive(Debug, Clone)]
pub struct MessageStore {
    dir: PathBuf,
}

impl MessageStore {
    pub fn new(base: impl AsRef<Path>, user: &str, mailbox: &str) -> Self {
        Self {
            dir: base.as_ref().join(user).join(mailbox),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn message_path(&self, uid: u32) -> PathBuf {
        self.dir.join(format!("{uid}.eml"))
    }

    pub async fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::new(&self.dir, e))
    }

    /// Reads a cached message, or `None` when it has not been saved yet.
    pub async fn load(&self, uid: u32) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.message_path(uid);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::new(path, e)),
        }
    }

    pub async fn save(&self, uid: u32, raw: &[u8]) -> Result<(), StoreError> {
        let path = self.message_path(uid);
        fs::write(&path, raw)
            .await
            .map_err(|e| StoreError::new(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(tmp: &TempDir) -> MessageStore {
        MessageStore::new(tmp.path(), "me@example.com", "INBOX")
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        store.ensure_dir().await.unwrap();

        store.save(42, b"Subject: hi\r\n\r\nbody").await.unwrap();
        let loaded = store.load(42).await.unwrap();
        assert_eq!(loaded.as_deref(), Some(&b"Subject: hi\r\n\r\nbody"[..]));
    }

    #[tokio::test]
    async fn missing_message_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        store.ensure_dir().await.unwrap();

        assert!(store.load(7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ensure_dir_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        store.ensure_dir().await.unwrap();
        store.ensure_dir().await.unwrap();
        assert!(store.dir().is_dir());
    }

    #[test]
    fn message_path_layout() {
        let store = MessageStore::new("/var/mail", "me@example.com", "Archive");
        assert_eq!(
            store.message_path(1234),
            PathBuf::from("/var/mail/me@example.com/Archive/1234.eml")
        );
    }

    #[tokio::test]
    async fn save_without_dir_reports_the_path() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        // ensure_dir deliberately not called
        let err = store.save(1, b"x").await.unwrap_err();
        assert!(err.path.ends_with("1.eml"));
    }
}
