//! Background segmentation backends.
//!
//! The model itself lives outside this service. A [`Segmenter`] takes the
//! uploaded image bytes and returns PNG bytes with the background removed.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::config::settings::SegmenterSettings;

pub mod command;
pub mod http;

pub use command::CommandSegmenter;
pub use http::HttpSegmenter;

#[derive(Debug, Error)]
pub enum SegmentationError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("segmentation process I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
    #[error("segmentation request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("segmentation service responded with {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("segmentation returned no data")]
    EmptyOutput,
}

#[async_trait]
pub trait Segmenter: Send + Sync {
    async fn remove_background(&self, image: Bytes) -> Result<Bytes, SegmentationError>;
}

pub fn from_settings(settings: &SegmenterSettings) -> Result<Arc<dyn Segmenter>, SegmentationError> {
    match settings {
        SegmenterSettings::Command { program, args } => {
            Ok(Arc::new(CommandSegmenter::new(program.clone(), args.clone())))
        }
        SegmenterSettings::Http { url } => Ok(Arc::new(HttpSegmenter::new(url.clone())?)),
    }
}
