use axum::http::StatusCode;
use thiserror::Error;

use crate::common::response::ApiError;
use crate::common::upload::UploadError;
use crate::infrastructure::segmentation::SegmentationError;
use crate::infrastructure::storage::StorageError;

#[derive(Debug, Error)]
pub enum RemovalError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Segmentation(#[from] SegmentationError),
    #[error("segmentation result is not a PNG image")]
    InvalidOutput,
}

impl RemovalError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RemovalError::Upload(e) => e.status_code(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RemovalError> for ApiError {
    fn from(e: RemovalError) -> Self {
        let status = e.status_code();
        let message = match &e {
            RemovalError::Upload(inner) => inner.to_string(),
            other => format!("Image processing error: {}", other),
        };
        ApiError(message, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        let err: ApiError = RemovalError::from(UploadError::NotAnImage).into();
        assert_eq!(err.1, StatusCode::BAD_REQUEST);
        assert_eq!(err.0, "File must be an image");
    }

    #[test]
    fn processing_errors_embed_the_cause() {
        let err: ApiError = RemovalError::from(SegmentationError::EmptyOutput).into();
        assert_eq!(err.1, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.0, "Image processing error: segmentation returned no data");
    }
}
