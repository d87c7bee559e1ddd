use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::info;

use super::{validate_key, Blob, BlobStore, StorageError};

/// A directory on local disk, one file per key.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Creates the directory if it does not exist yet.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|source| StorageError::Io {
            key: root.display().to_string(),
            source,
        })?;

        info!("✅ Staging directory ready: {}", root.display());
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::write(&path, &data).await.map_err(|e| io_error(key, e))
    }

    async fn get(&self, key: &str) -> Result<Option<Blob>, StorageError> {
        let path = self.path_for(key)?;
        let file = match fs::File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(key, e)),
        };
        let size = file.metadata().await.map_err(|e| io_error(key, e))?.len();

        Ok(Some(Blob {
            size: Some(size),
            stream: ReaderStream::new(file).boxed(),
        }))
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;

    async fn read_all(blob: Blob) -> Vec<u8> {
        let chunks: Vec<Bytes> = blob.stream.try_collect().await.unwrap();
        chunks.concat()
    }

    #[tokio::test]
    async fn stores_reads_and_deletes_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("processed")).await.unwrap();

        store
            .put("abc_output.png", Bytes::from_static(b"png-bytes"))
            .await
            .unwrap();
        assert!(dir.path().join("processed/abc_output.png").exists());

        let blob = store.get("abc_output.png").await.unwrap().unwrap();
        assert_eq!(blob.size, Some(9));
        assert_eq!(read_all(blob).await, b"png-bytes");

        assert!(store.delete("abc_output.png").await.unwrap());
        assert!(!store.delete("abc_output.png").await.unwrap());
        assert!(store.get("abc_output.png").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_keys_that_escape_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();

        let err = store
            .put("../outside.png", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
