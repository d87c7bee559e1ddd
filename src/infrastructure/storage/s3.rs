use async_trait::async_trait;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{config::BehaviorVersion, config::Credentials, config::Region, Client};
use bytes::Bytes;
use futures_util::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::info;

use super::{validate_key, Blob, BlobStore, StorageError};

/// One staging area inside an S3-compatible bucket, addressed by key prefix.
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3BlobStore {
    pub fn connect(endpoint: &str, region: &str, access_key: &str, secret_key: &str) -> Client {
        let credentials = Credentials::new(access_key, secret_key, None, None, "static");

        let config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .force_path_style(true) // Required for MinIO
            .build();

        info!("✅ S3 client configured for {}", endpoint);
        Client::from_conf(config)
    }

    pub fn new(client: Client, bucket: &str, prefix: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            prefix: prefix.trim_matches('/').to_string(),
        }
    }

    fn object_key(&self, key: &str) -> Result<String, StorageError> {
        validate_key(key)?;
        if self.prefix.is_empty() {
            Ok(key.to_string())
        } else {
            Ok(format!("{}/{}", self.prefix, key))
        }
    }
}

fn request_error<E>(key: &str, err: E) -> StorageError
where
    E: std::error::Error,
{
    StorageError::ObjectStore {
        key: key.to_string(),
        message: DisplayErrorContext(err).to_string(),
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        let object_key = self.object_key(key)?;
        let content_type = mime_guess::from_path(key).first_or_octet_stream().to_string();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| request_error(&object_key, e))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Blob>, StorageError> {
        let object_key = self.object_key(key)?;

        let resp = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_key()) => return Ok(None),
            Err(e) => return Err(request_error(&object_key, e)),
        };

        let size = resp.content_length().and_then(|l| u64::try_from(l).ok());
        let reader = resp.body.into_async_read();

        Ok(Some(Blob {
            size,
            stream: ReaderStream::new(reader).boxed(),
        }))
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let object_key = self.object_key(key)?;

        // DeleteObject succeeds for missing keys, so probe first.
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
        {
            Ok(_) => {}
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => return Ok(false),
            Err(e) => return Err(request_error(&object_key, e)),
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
            .map_err(|e| request_error(&object_key, e))?;

        Ok(true)
    }
}
