//! Binary object storage for uploaded documents.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use crate::errors::ServiceError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid object path: {0}")]
    InvalidPath(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidPath(path) => {
                ServiceError::InvalidInput(format!("invalid object path: {}", path))
            }
            StorageError::Io(e) => ServiceError::StorageError(e.to_string()),
        }
    }
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `bytes` at `path`, replacing any existing object.
    async fn upload(&self, path: &str, bytes: Bytes) -> Result<(), StorageError>;

    /// Public URL under which `path` is served.
    fn public_url(&self, path: &str) -> String;
}

/// Stores objects below a root directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: Option<String>) -> Self {
        let public_base_url = public_base_url
            .unwrap_or_else(|| "/files".to_string())
            .trim_end_matches('/')
            .to_string();
        Self {
            root: root.into(),
            public_base_url,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let clean = !path.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !clean {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(&self, path: &str, bytes: Bytes) -> Result<(), StorageError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::File::create(&target).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;

        debug!(target = %target.display(), "object stored");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn uploads_below_root() {
        let dir = TempDir::new().unwrap();
        let storage = LocalObjectStorage::new(dir.path(), Some("https://files.test/".into()));

        storage
            .upload("work-instructions/1.pdf", Bytes::from_static(b"%PDF"))
            .await
            .unwrap();

        let stored = std::fs::read(dir.path().join("work-instructions/1.pdf")).unwrap();
        assert_eq!(stored, b"%PDF");
        assert_eq!(
            storage.public_url("work-instructions/1.pdf"),
            "https://files.test/work-instructions/1.pdf"
        );
    }

    #[tokio::test]
    async fn rejects_paths_escaping_the_root() {
        let dir = TempDir::new().unwrap();
        let storage = LocalObjectStorage::new(dir.path(), None);

        for path in ["../evil", "/etc/passwd", ""] {
            assert!(matches!(
                storage.upload(path, Bytes::new()).await,
                Err(StorageError::InvalidPath(_))
            ));
        }
        assert_eq!(storage.public_url("a/b.pdf"), "/files/a/b.pdf");
    }
}
