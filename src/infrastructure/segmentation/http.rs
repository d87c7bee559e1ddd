use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use tracing::info;
use url::Url;

use super::{SegmentationError, Segmenter};

/// Posts each image to a remote segmentation server, e.g. `rembg s` at
/// `/api/remove`, as a multipart `file` field and returns the response body.
#[derive(Debug, Clone)]
pub struct HttpSegmenter {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSegmenter {
    pub fn new(endpoint: Url) -> Result<Self, SegmentationError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Segmenter for HttpSegmenter {
    async fn remove_background(&self, image: Bytes) -> Result<Bytes, SegmentationError> {
        info!("Sending {} bytes to {}", image.len(), self.endpoint);

        let part = Part::bytes(image.to_vec()).file_name("image");
        let form = Form::new().part("file", part);

        let resp = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SegmentationError::Rejected {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let body = resp.bytes().await?;
        if body.is_empty() {
            return Err(SegmentationError::EmptyOutput);
        }
        Ok(body)
    }
}
