//! Local filesystem implementation of the BlobStore trait

use crate::menu_cache::{BlobStore, CacheError};
use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores each blob as a file directly under `base_path`
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    base_path: PathBuf,
}

impl LocalBlobStore {
    /// Create a store rooted at `base_path`
    ///
    /// The directory is not touched until the first write.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn blob_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    /// Write via a sibling temp file and rename over the target
    fn put_atomic(&self, name: &str, blob: &str) -> Result<(), CacheError> {
        fs::create_dir_all(&self.base_path)?;

        let final_path = self.blob_path(name);
        let temp_path = self.base_path.join(format!("{}.tmp", name));
        fs::write(&temp_path, blob)?;
        fs::rename(&temp_path, &final_path)?;

        debug!("Stored blob {} at {:?}", name, final_path);
        Ok(())
    }
}

#[async_trait::async_trait]
impl BlobStore for LocalBlobStore {
    async fn last_write(&self, name: &str) -> Result<Option<DateTime<Utc>>, CacheError> {
        match tokio::fs::metadata(self.blob_path(name)).await {
            Ok(metadata) => Ok(Some(DateTime::from(metadata.modified()?))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn load(&self, name: &str) -> Result<String, CacheError> {
        Ok(tokio::fs::read_to_string(self.blob_path(name)).await?)
    }

    async fn store(&self, name: &str, blob: &str) -> Result<(), CacheError> {
        let store = self.clone();
        let name = name.to_string();
        let blob = blob.to_string();

        tokio::task::spawn_blocking(move || store.put_atomic(&name, &blob)).await?
    }
}
