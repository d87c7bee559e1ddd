//! Keyed blob storage for the staging areas.
//!
//! Every backend stores opaque bytes under a flat key such as
//! `{uuid}_output.png`. Handlers only see [`BlobStore`], so the same flow runs
//! against a local directory, an S3 bucket or an in-memory map.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use thiserror::Error;

use crate::config::settings::StorageSettings;

pub mod local;
pub mod memory;
pub mod s3;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
pub use s3::S3BlobStore;

pub type BlobStream = BoxStream<'static, io::Result<Bytes>>;

/// A stored blob opened for reading.
pub struct Blob {
    pub size: Option<u64>,
    pub stream: BlobStream,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("object storage request failed for {key}: {message}")]
    ObjectStore { key: String, message: String },
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `data` under `key`, replacing any previous blob.
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StorageError>;

    /// Opens the blob stored under `key`, `None` if there is none.
    async fn get(&self, key: &str) -> Result<Option<Blob>, StorageError>;

    /// Removes the blob under `key`. Returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;
}

/// Keys are single path segments; anything else never reaches a backend.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && !key.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Input and output areas built from config.
pub struct StagingAreas {
    pub uploads: Arc<dyn BlobStore>,
    pub processed: Arc<dyn BlobStore>,
}

impl StagingAreas {
    pub async fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        match settings {
            StorageSettings::Local {
                upload_dir,
                processed_dir,
            } => Ok(Self {
                uploads: Arc::new(LocalBlobStore::new(upload_dir).await?),
                processed: Arc::new(LocalBlobStore::new(processed_dir).await?),
            }),
            StorageSettings::S3(s3) => {
                let client = S3BlobStore::connect(&s3.endpoint, &s3.region, &s3.access_key, &s3.secret_key);
                Ok(Self {
                    uploads: Arc::new(S3BlobStore::new(client.clone(), &s3.bucket, "uploads")),
                    processed: Arc::new(S3BlobStore::new(client, &s3.bucket, "processed")),
                })
            }
            StorageSettings::Memory => Ok(Self {
                uploads: Arc::new(MemoryBlobStore::new()),
                processed: Arc::new(MemoryBlobStore::new()),
            }),
        }
    }
}
