//! File-backed store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use super::validate_name;
use crate::domain::ports::Store;
use crate::error::StoreError;

/// A store keeping one file per key: `{root}/{namespace}/{key}`.
///
/// Writes go to a temporary sibling file that is then renamed over the target, so
/// a crash mid-write leaves either the old or the new value, never a torn one.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        info!(root = %root.display(), "File store opened");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deletes every stored entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be removed or recreated.
    pub async fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::create_dir_all(&self.root).await?;
        info!(root = %self.root.display(), "File store cleared");
        Ok(())
    }

    fn path(&self, namespace: &str, key: &str) -> Result<PathBuf, StoreError> {
        validate_name(namespace)?;
        validate_name(key)?;
        Ok(self.root.join(namespace).join(key))
    }
}

#[async_trait]
impl Store for FileStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path(namespace, key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, namespace: &str, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        let path = self.path(namespace, key)?;
        let dir = self.root.join(namespace);
        fs::create_dir_all(&dir).await?;

        let tmp = dir.join(format!(".{key}.tmp"));
        fs::write(&tmp, &value).await?;
        fs::rename(&tmp, &path).await?;

        debug!(namespace, key, bytes = value.len(), "Stored entry");
        Ok(())
    }

    async fn remove(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        let path = self.path(namespace, key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
