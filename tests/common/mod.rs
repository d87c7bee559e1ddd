#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use background_removal_api::app::create_app;
use background_removal_api::config::AppConfig;
use background_removal_api::infrastructure::segmentation::{SegmentationError, Segmenter};
use background_removal_api::infrastructure::storage::{BlobStore, MemoryBlobStore};
use background_removal_api::state::AppState;
use bytes::Bytes;
use tower::ServiceExt;

/// 1x1 fully transparent RGBA PNG.
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0x00, 0x00, 0x00, 0x0b, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x60, 0x00, 0x02, 0x00,
    0x00, 0x05, 0x00, 0x01, 0x7a, 0x5e, 0xab, 0x3f, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44,
    0xae, 0x42, 0x60, 0x82,
];

/// Byte offset of the IHDR colour type; 6 means RGBA.
pub const PNG_COLOR_TYPE_OFFSET: usize = 25;

const BOUNDARY: &str = "----bgremovaltestboundary";

/// Returns a fixed PNG and records what the uploads area held during the call.
pub struct StubSegmenter {
    output: Bytes,
    uploads: Option<MemoryBlobStore>,
    calls: AtomicUsize,
    seen_inputs: Mutex<Vec<String>>,
}

impl StubSegmenter {
    pub fn returning(output: &'static [u8]) -> Self {
        Self {
            output: Bytes::from_static(output),
            uploads: None,
            calls: AtomicUsize::new(0),
            seen_inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn watching(mut self, uploads: MemoryBlobStore) -> Self {
        self.uploads = Some(uploads);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_inputs(&self) -> Vec<String> {
        self.seen_inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Segmenter for StubSegmenter {
    async fn remove_background(&self, _image: Bytes) -> Result<Bytes, SegmentationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(uploads) = &self.uploads {
            let keys = uploads.keys().await;
            self.seen_inputs.lock().unwrap().extend(keys);
        }
        Ok(self.output.clone())
    }
}

pub struct FailingSegmenter;

#[async_trait]
impl Segmenter for FailingSegmenter {
    async fn remove_background(&self, _image: Bytes) -> Result<Bytes, SegmentationError> {
        Err(SegmentationError::Rejected {
            status: 500,
            body: "model crashed".to_string(),
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub uploads: MemoryBlobStore,
    pub processed: MemoryBlobStore,
}

impl TestApp {
    pub fn with_segmenter(segmenter: Arc<dyn Segmenter>) -> Self {
        Self::with_stores(MemoryBlobStore::new(), MemoryBlobStore::new(), segmenter)
    }

    pub fn with_config(config: AppConfig, segmenter: Arc<dyn Segmenter>) -> Self {
        Self::build(config, MemoryBlobStore::new(), MemoryBlobStore::new(), segmenter)
    }

    pub fn with_stores(uploads: MemoryBlobStore, processed: MemoryBlobStore, segmenter: Arc<dyn Segmenter>) -> Self {
        Self::build(AppConfig::default(), uploads, processed, segmenter)
    }

    fn build(
        config: AppConfig,
        uploads: MemoryBlobStore,
        processed: MemoryBlobStore,
        segmenter: Arc<dyn Segmenter>,
    ) -> Self {
        let uploads_store: Arc<dyn BlobStore> = Arc::new(uploads.clone());
        let processed_store: Arc<dyn BlobStore> = Arc::new(processed.clone());
        let state = AppState::new(config, uploads_store, processed_store, segmenter);

        Self {
            router: create_app(state),
            uploads,
            processed,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn upload(&self, file_name: &str, content_type: &str, data: &[u8]) -> Response {
        self.send(multipart_request("file", file_name, content_type, data)).await
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        self.send(
            Request::builder()
                .method(Method::DELETE)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn stores_are_empty(&self) -> bool {
        self.uploads.is_empty().await && self.processed.is_empty().await
    }
}

pub fn multipart_request(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/remove-background")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Bytes {
    to_bytes(response.into_body(), usize::MAX).await.unwrap()
}

pub async fn json_body(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
