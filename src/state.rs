use std::sync::Arc;

use crate::config::settings::AppConfig;
use crate::infrastructure::segmentation::{self, Segmenter};
use crate::infrastructure::storage::{BlobStore, StagingAreas};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub uploads: Arc<dyn BlobStore>,
    pub processed: Arc<dyn BlobStore>,
    pub segmenter: Arc<dyn Segmenter>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        uploads: Arc<dyn BlobStore>,
        processed: Arc<dyn BlobStore>,
        segmenter: Arc<dyn Segmenter>,
    ) -> Self {
        Self {
            config,
            uploads,
            processed,
            segmenter,
        }
    }

    /// Builds the storage areas and segmentation backend named in `config`.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let areas = StagingAreas::from_settings(&config.storage).await?;
        let segmenter = segmentation::from_settings(&config.segmenter)?;

        Ok(Self::new(config, areas.uploads, areas.processed, segmenter))
    }
}
