//! Local-filesystem blob store
//!
//! Holds uploaded file bytes in a single directory, addressed by a
//! generated storage name that is distinct from the user-supplied
//! filename. The store never sees database state; record bookkeeping
//! lives with the file service.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::core::error::AppError;

pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create a blob store rooted at the configured upload directory
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: config.upload_dir.clone(),
        }
    }

    /// Ensure the storage directory exists, create if not
    pub async fn ensure_root_exists(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::StorageFailure(format!(
                "Failed to create upload directory {}: {}",
                self.root.display(),
                e
            ))
        })?;
        info!("Blob store ready at {}", self.root.display());
        Ok(())
    }

    /// Generate a collision-resistant storage name, preserving the extension
    pub fn generate_storage_name(extension: &str) -> String {
        let id = Uuid::new_v4();
        if extension.is_empty() {
            id.to_string()
        } else {
            format!("{}.{}", id, extension)
        }
    }

    /// Absolute path of a stored blob
    pub fn path_for(&self, storage_name: &str) -> PathBuf {
        self.root.join(storage_name)
    }

    /// Write blob bytes under the given storage name
    pub async fn store(&self, storage_name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        let path = self.path_for(storage_name);
        fs::write(&path, bytes).await.map_err(|e| {
            AppError::StorageFailure(format!("Failed to write {}: {}", path.display(), e))
        })?;
        debug!("Stored blob: {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    /// Read blob bytes back, or NotFound if the blob is missing on disk
    pub async fn read(&self, storage_name: &str) -> Result<Vec<u8>, AppError> {
        let path = self.path_for(storage_name);
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound("File not found on server".to_string()))
            }
            Err(e) => Err(AppError::StorageFailure(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Remove a blob. Missing blobs are tolerated (soft-deleted records
    /// may already have lost their bytes).
    pub async fn remove(&self, storage_name: &str) -> Result<(), AppError> {
        let path = self.path_for(storage_name);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed blob: {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::StorageFailure(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Whether a blob exists on disk
    pub async fn exists(&self, storage_name: &str) -> bool {
        fs::try_exists(self.path_for(storage_name))
            .await
            .unwrap_or(false)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> BlobStore {
        let dir = std::env::temp_dir().join(format!("blob-store-test-{}", Uuid::new_v4()));
        BlobStore { root: dir }
    }

    #[tokio::test]
    async fn test_store_read_remove_roundtrip() {
        let store = test_store();
        store.ensure_root_exists().await.unwrap();

        let name = BlobStore::generate_storage_name("csv");
        assert!(name.ends_with(".csv"));

        store.store(&name, b"a,b\n1,2\n").await.unwrap();
        assert!(store.exists(&name).await);
        assert_eq!(store.read(&name).await.unwrap(), b"a,b\n1,2\n");

        store.remove(&name).await.unwrap();
        assert!(!store.exists(&name).await);
        // Removing again is not an error
        store.remove(&name).await.unwrap();
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let store = test_store();
        store.ensure_root_exists().await.unwrap();

        let err = store.read("missing.csv").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_storage_names_are_unique() {
        let a = BlobStore::generate_storage_name("json");
        let b = BlobStore::generate_storage_name("json");
        assert_ne!(a, b);
    }
}
