use std::sync::Arc;

use bytes::Bytes;
use tracing::warn;

use crate::infrastructure::storage::{BlobStore, StorageError};

/// A blob written to a staging area that is deleted again unless persisted.
///
/// Call [`StagedBlob::release`] or [`StagedBlob::persist`] on every normal
/// path. If the guard is dropped while still armed (the request future was
/// cancelled, or a panic unwound through it) the deletion is spawned on the
/// current runtime instead.
pub struct StagedBlob {
    store: Arc<dyn BlobStore>,
    key: String,
    armed: bool,
}

impl StagedBlob {
    /// Writes `data` under `key`. A failed write is cleaned up before returning.
    pub async fn stage(store: &Arc<dyn BlobStore>, key: String, data: Bytes) -> Result<Self, StorageError> {
        let staged = Self {
            store: Arc::clone(store),
            key,
            armed: true,
        };

        if let Err(e) = staged.store.put(&staged.key, data).await {
            staged.release().await;
            return Err(e);
        }
        Ok(staged)
    }

    #[cfg(test)]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Keeps the blob.
    pub fn persist(mut self) {
        self.armed = false;
    }

    /// Deletes the blob now. Failures are logged, not returned.
    pub async fn release(mut self) {
        self.armed = false;
        if let Err(e) = self.store.delete(&self.key).await {
            warn!("Failed to delete staged blob {}: {}", self.key, e);
        }
    }
}

impl Drop for StagedBlob {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let store = Arc::clone(&self.store);
        let key = std::mem::take(&mut self.key);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = store.delete(&key).await {
                        warn!("Failed to delete abandoned blob {}: {}", key, e);
                    }
                });
            }
            Err(_) => warn!("No runtime to delete abandoned blob {}", key),
        }
    }
}
