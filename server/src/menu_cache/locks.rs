//! Per-entry locks so that one miss per key is in flight at a time

use crate::menu_cache::CacheKey;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per cache key, created lazily
///
/// Holders of a key's guard are the only ones allowed to refill that entry.
/// Other keys are never blocked.
#[derive(Debug, Default)]
pub struct KeyLocks {
    locks: Mutex<HashMap<CacheKey, Arc<AsyncMutex<()>>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no one else holds `key`
    pub async fn acquire(&self, key: CacheKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(key).or_default().clone()
        };
        lock.lock_owned().await
    }
}
