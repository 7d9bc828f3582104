//! Time-bounded cache for the menu page and parsed weekday menus
//!
//! Entries are named blobs behind the `BlobStore` trait. `CacheStore` layers
//! the TTL rule on top: an entry is usable only while
//! `now - last_write < ttl`. Read-side failures degrade to a cache miss,
//! write-side failures are returned to the caller.

pub mod local;
pub mod locks;

use chrono::{DateTime, Duration, Utc};
use lunchmenu_model::Weekday;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub use local::LocalBlobStore;
pub use locks::KeyLocks;

/// Default entry lifetime
pub const DEFAULT_TTL_HOURS: u64 = 24;

/// File name of the raw menu page entry
pub const RAW_HTML_ENTRY: &str = "menu-cache.html";

/// Error type for cache operations
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Identifies one cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The stripped HTML of the menu page
    RawHtml,
    /// Parsed items for a single weekday
    Weekday(Weekday),
}

impl CacheKey {
    /// Blob name used by the backing store
    pub fn entry_name(&self) -> String {
        match self {
            CacheKey::RawHtml => RAW_HTML_ENTRY.to_string(),
            CacheKey::Weekday(day) => format!("{}.json", day.as_str()),
        }
    }
}

/// Persistent storage for named blobs
///
/// Implementations report the last write time explicitly so that callers
/// never need to look at backend-specific metadata.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// When the blob was last written, or `None` if it does not exist
    async fn last_write(&self, name: &str) -> Result<Option<DateTime<Utc>>, CacheError>;

    /// Read the full blob
    async fn load(&self, name: &str) -> Result<String, CacheError>;

    /// Replace the blob. Creates the storage location if needed.
    ///
    /// Must be atomic: readers see either the old or the new content.
    async fn store(&self, name: &str, blob: &str) -> Result<(), CacheError>;
}

/// Read-through cache over a `BlobStore` with a fixed TTL
#[derive(Clone)]
pub struct CacheStore {
    blobs: Arc<dyn BlobStore>,
    ttl: Duration,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("blobs", &"<dyn BlobStore>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl CacheStore {
    pub fn new(blobs: Arc<dyn BlobStore>, ttl: Duration) -> Self {
        Self { blobs, ttl }
    }

    /// Cache with the default 24 hour TTL
    pub fn with_default_ttl(blobs: Arc<dyn BlobStore>) -> Self {
        Self::new(blobs, Duration::hours(DEFAULT_TTL_HOURS as i64))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Last write time of an entry, as reported by the backing store
    pub async fn last_write(&self, key: CacheKey) -> Result<Option<DateTime<Utc>>, CacheError> {
        self.blobs.last_write(&key.entry_name()).await
    }

    /// Whether the entry exists and is younger than the TTL.
    ///
    /// Fails closed: a missing entry or unreadable metadata is "not valid".
    pub async fn is_valid(&self, key: CacheKey) -> bool {
        match self.last_write(key).await {
            Ok(Some(written_at)) => Utc::now() - written_at < self.ttl,
            Ok(None) => false,
            Err(e) => {
                warn!("Failed to stat cache entry {}: {}", key.entry_name(), e);
                false
            }
        }
    }

    /// Content of a valid entry, `None` on any miss or read failure
    pub async fn read(&self, key: CacheKey) -> Option<String> {
        if !self.is_valid(key).await {
            debug!("Cache miss: {}", key.entry_name());
            return None;
        }

        match self.blobs.load(&key.entry_name()).await {
            Ok(blob) => Some(blob),
            Err(e) => {
                warn!("Failed to read cache entry {}: {}", key.entry_name(), e);
                None
            }
        }
    }

    /// Overwrite an entry. Errors are returned, never swallowed.
    pub async fn write(&self, key: CacheKey, blob: &str) -> Result<(), CacheError> {
        self.blobs.store(&key.entry_name(), blob).await?;
        debug!("Cached {} ({} bytes)", key.entry_name(), blob.len());
        Ok(())
    }

    /// Like `read`, but deserializes JSON. Undecodable content counts as a miss.
    pub async fn read_json<T: DeserializeOwned>(&self, key: CacheKey) -> Option<T> {
        let blob = self.read(key).await?;
        match serde_json::from_str(&blob) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding undecodable cache entry {}: {}", key.entry_name(), e);
                None
            }
        }
    }

    pub async fn write_json<T: Serialize>(&self, key: CacheKey, value: &T) -> Result<(), CacheError> {
        let blob = serde_json::to_string(value)?;
        self.write(key, &blob).await
    }
}
