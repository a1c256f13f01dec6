
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::timeout;

use crate::fingerprint::Fingerprint;
use crate::models::IngestError;

/// In-process coordination for the commit pipeline.
///
/// Owns the global commit lock, which fully serializes publishes, and a map
/// of per-fingerprint locks, which serialize concurrent uploads of identical
/// content against each other without blocking unrelated uploads. Guards are
/// RAII, so every exit path releases.
pub struct LockRegistry {
    commit: Arc<Mutex<()>>,
    by_fingerprint: DashMap<Fingerprint, Arc<Mutex<()>>>,
    acquire_timeout: Duration
}

impl LockRegistry {
    pub fn new(acquire_timeout: Duration) -> Self {
        Self {
            commit: Arc::new(Mutex::new(())),
            by_fingerprint: DashMap::new(),
            acquire_timeout
        }
    }

    /// Acquires the global commit lock with a bounded wait.
    ///
    /// # Errors
    /// Returns `IngestError::LockTimeout` if the wait exceeds the configured
    /// timeout; the caller may retry.
    pub async fn lock_commit(&self) -> Result<OwnedMutexGuard<()>, IngestError> {
        self.acquire("commit", Arc::clone(&self.commit)).await
    }

    /// Acquires the lock for one fingerprint with a bounded wait, creating
    /// the lock on first use.
    pub async fn lock_fingerprint(&self, fingerprint: &Fingerprint) -> Result<OwnedMutexGuard<()>, IngestError> {
        let lock = self.by_fingerprint
            .entry(fingerprint.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        self.acquire("fingerprint", lock).await
    }

    /// Drops the map entry for a fingerprint once its manifest entry is
    /// durable. Later uploads of the same content resolve through the
    /// manifest instead, so the map stays bounded under sustained
    /// unique-content ingestion. Holders of the old lock are unaffected.
    pub fn evict(&self, fingerprint: &Fingerprint) {
        self.by_fingerprint.remove(fingerprint);
    }

    /// Number of fingerprints currently holding a map entry.
    pub fn pending_fingerprints(&self) -> usize {
        self.by_fingerprint.len()
    }

    async fn acquire(&self, lock_name: &'static str, lock: Arc<Mutex<()>>) -> Result<OwnedMutexGuard<()>, IngestError> {
        timeout(self.acquire_timeout, lock.lock_owned()).await.map_err(|_| {
            IngestError::LockTimeout {
                lock: lock_name,
                timeout: self.acquire_timeout
            }
        })
    }
}
