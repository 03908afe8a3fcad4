use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::data::media_store::{MediaStore, MediaStoreError, is_safe_file_name};

/// Stores media as plain files under a single directory.
#[derive(Debug, Clone)]
pub(crate) struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    fn path_for(&self, file_name: &str) -> Result<PathBuf, MediaStoreError> {
        if !is_safe_file_name(file_name) {
            return Err(MediaStoreError::InvalidName(file_name.to_string()));
        }
        Ok(self.root.join(file_name))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn write(&self, file_name: &str, bytes: &[u8]) -> Result<(), MediaStoreError> {
        let path = self.path_for(file_name)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| MediaStoreError::Io {
                name: file_name.to_string(),
                source,
            })
    }

    async fn remove(&self, file_name: &str) -> Result<(), MediaStoreError> {
        let path = self.path_for(file_name)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => MediaStoreError::NotFound(file_name.to_string()),
                _ => MediaStoreError::Io {
                    name: file_name.to_string(),
                    source,
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::LocalMediaStore;
    use crate::data::media_store::{MediaStore, MediaStoreError};

    #[tokio::test]
    async fn write_then_remove_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalMediaStore::new(dir.path().join("uploads"));
        store.ensure_root().await.expect("root must be created");

        store
            .write("1_cafebabe.png", b"png-bytes")
            .await
            .expect("write must succeed");
        let stored = std::fs::read(store.root().join("1_cafebabe.png")).expect("file exists");
        assert_eq!(stored, b"png-bytes");

        store
            .remove("1_cafebabe.png")
            .await
            .expect("remove must succeed");
        assert!(!store.root().join("1_cafebabe.png").exists());
    }

    #[tokio::test]
    async fn removing_missing_file_reports_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalMediaStore::new(dir.path());

        let err = store.remove("missing.png").await.expect_err("must fail");
        assert!(matches!(err, MediaStoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn path_traversal_names_are_refused() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalMediaStore::new(dir.path());

        let err = store
            .write("../escape.png", b"x")
            .await
            .expect_err("must fail");
        assert!(matches!(err, MediaStoreError::InvalidName(_)));
    }
}
