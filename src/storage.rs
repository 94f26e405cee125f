//! Source blob storage
//!
//! Submitted source code is stored outside the submission row, addressed by
//! the submission token.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const SOURCE_EXTENSION: &str = "src";

/// Durable store for submitted sources
#[async_trait]
pub trait SourceStore: Send + Sync {
    async fn put(&self, token: &Uuid, source: &[u8]) -> AppResult<()>;

    async fn get(&self, token: &Uuid) -> AppResult<Option<Vec<u8>>>;

    /// Remove one source; a missing source is not an error
    async fn delete(&self, token: &Uuid) -> AppResult<()>;

    /// Remove every stored source
    async fn clear(&self) -> AppResult<()>;
}

/// Sources stored as one file per token under a root directory
pub struct FsSourceStore {
    root: PathBuf,
}

impl FsSourceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, token: &Uuid) -> PathBuf {
        self.root.join(format!("{}.{}", token, SOURCE_EXTENSION))
    }

    fn is_source_file(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
    }
}

#[async_trait]
impl SourceStore for FsSourceStore {
    async fn put(&self, token: &Uuid, source: &[u8]) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;

        // Write then rename so a crash never leaves a truncated source behind
        let path = self.path_for(token);
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, source).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!(%token, bytes = source.len(), "Stored submission source");
        Ok(())
    }

    async fn get(&self, token: &Uuid) -> AppResult<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(token)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, token: &Uuid) -> AppResult<()> {
        match tokio::fs::remove_file(self.path_for(token)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self) -> AppResult<()> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if Self::is_source_file(&path) {
                tokio::fs::remove_file(&path).await?;
            }
        }
        Ok(())
    }
}

/// Sources kept in process memory
#[derive(Default)]
pub struct MemorySourceStore {
    blobs: Mutex<HashMap<Uuid, Vec<u8>>>,
}

impl MemorySourceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SourceStore for MemorySourceStore {
    async fn put(&self, token: &Uuid, source: &[u8]) -> AppResult<()> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(*token, source.to_vec());
        Ok(())
    }

    async fn get(&self, token: &Uuid) -> AppResult<Option<Vec<u8>>> {
        Ok(self
            .blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned())
    }

    async fn delete(&self, token: &Uuid) -> AppResult<()> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).clear();
        Ok(())
    }
}

/// Decode stored source bytes for the judge, which expects UTF-8 text
pub fn source_text(bytes: Vec<u8>) -> AppResult<String> {
    String::from_utf8(bytes)
        .map_err(|_| AppError::Validation("Source code must be valid UTF-8".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fs_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsSourceStore::new(dir.path().join("sources"));
        let token = Uuid::new_v4();

        assert!(store.get(&token).await.unwrap().is_none());

        store.put(&token, b"print(42)").await.unwrap();
        assert_eq!(store.get(&token).await.unwrap().unwrap(), b"print(42)");

        let unrelated = dir.path().join("sources").join("keep.txt");
        tokio::fs::write(&unrelated, b"x").await.unwrap();

        store.clear().await.unwrap();
        assert!(store.get(&token).await.unwrap().is_none());
        assert!(unrelated.exists());
    }

    #[tokio::test]
    async fn test_fs_store_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsSourceStore::new(dir.path());
        let (kept, removed) = (Uuid::new_v4(), Uuid::new_v4());
        store.put(&kept, b"a").await.unwrap();
        store.put(&removed, b"b").await.unwrap();

        store.delete(&removed).await.unwrap();
        store.delete(&removed).await.unwrap();

        assert!(store.get(&removed).await.unwrap().is_none());
        assert_eq!(store.get(&kept).await.unwrap().unwrap(), b"a");
    }

    #[tokio::test]
    async fn test_clear_on_missing_root_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsSourceStore::new(dir.path().join("never-created"));
        store.clear().await.unwrap();
    }

    #[test]
    fn test_source_text_rejects_invalid_utf8() {
        assert_eq!(source_text(b"int main(){}".to_vec()).unwrap(), "int main(){}");
        assert!(matches!(
            source_text(vec![0xff, 0xfe]),
            Err(AppError::Validation(_))
        ));
    }
}
