use bytes::Bytes;
use tracing::{error, info};
use uuid::Uuid;

use super::error::RemovalError;
use super::staging::StagedBlob;
use crate::common::upload::ImageUpload;
use crate::infrastructure::storage::Blob;
use crate::state::AppState;

pub const ALLOWED_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png"];
pub const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

pub fn input_key(file_id: Uuid, extension: &str) -> String {
    format!("{}_input{}", file_id, extension)
}

pub fn output_key(file_id: Uuid) -> String {
    format!("{}_output.png", file_id)
}

pub fn download_name(file_id: Uuid) -> String {
    format!("removed_background_{}.png", file_id)
}

/// Only the lowercase hyphenated form handed out by the upload names a result.
pub fn parse_file_id(raw: &str) -> Option<Uuid> {
    Uuid::try_parse(raw)
        .ok()
        .filter(|id| id.hyphenated().to_string() == raw)
}

pub struct RemovalService;

impl RemovalService {
    /// Stages the upload, runs segmentation and stores the PNG result.
    ///
    /// The staged input is always deleted. The output is kept only on success.
    pub async fn remove_background(state: AppState, upload: ImageUpload) -> Result<Uuid, RemovalError> {
        let file_id = Uuid::new_v4();
        info!("Removing background from {} as {}", upload.file_name, file_id);

        let input = StagedBlob::stage(
            &state.uploads,
            input_key(file_id, &upload.extension),
            upload.data.clone(),
        )
        .await
        .inspect_err(|e| error!("Failed to stage input for {}: {}", file_id, e))?;

        let result = Self::segment_and_store(&state, file_id, upload.data).await;
        input.release().await;

        match result {
            Ok(output) => {
                output.persist();
                info!("Processing finished. File ID: {}", file_id);
                Ok(file_id)
            }
            Err(e) => {
                error!("Failed to process {}: {}", file_id, e);
                Err(e)
            }
        }
    }

    async fn segment_and_store(state: &AppState, file_id: Uuid, image: Bytes) -> Result<StagedBlob, RemovalError> {
        let cutout = state.segmenter.remove_background(image).await?;
        if !cutout.starts_with(PNG_SIGNATURE) {
            return Err(RemovalError::InvalidOutput);
        }
        info!("Background removed for {} ({} bytes)", file_id, cutout.len());

        let output = StagedBlob::stage(&state.processed, output_key(file_id), cutout).await?;
        Ok(output)
    }

    pub async fn open_result(state: AppState, file_id: Uuid) -> Result<Option<Blob>, RemovalError> {
        Ok(state.processed.get(&output_key(file_id)).await?)
    }

    /// Returns whether a result existed.
    pub async fn delete_result(state: AppState, file_id: Uuid) -> Result<bool, RemovalError> {
        let existed = state.processed.delete(&output_key(file_id)).await?;
        if existed {
            info!("Deleted result {}", file_id);
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_the_staging_layout() {
        let id = Uuid::parse_str("6f1c2a0e-8a51-4c1b-9d3e-5b7f1e2d4c6a").unwrap();
        assert_eq!(input_key(id, ".jpg"), "6f1c2a0e-8a51-4c1b-9d3e-5b7f1e2d4c6a_input.jpg");
        assert_eq!(output_key(id), "6f1c2a0e-8a51-4c1b-9d3e-5b7f1e2d4c6a_output.png");
        assert_eq!(
            download_name(id),
            "removed_background_6f1c2a0e-8a51-4c1b-9d3e-5b7f1e2d4c6a.png"
        );
    }

    #[test]
    fn only_uuids_are_file_ids() {
        assert!(parse_file_id("6f1c2a0e-8a51-4c1b-9d3e-5b7f1e2d4c6a").is_some());
        assert!(parse_file_id("../../etc/passwd").is_none());
        assert!(parse_file_id("").is_none());
    }

    #[test]
    fn other_spellings_of_a_uuid_are_not_file_ids() {
        let id = "6f1c2a0e-8a51-4c1b-9d3e-5b7f1e2d4c6a";
        for raw in [
            "6f1c2a0e8a514c1b9d3e5b7f1e2d4c6a".to_string(),
            id.to_uppercase(),
            format!("{{{id}}}"),
            format!("urn:uuid:{id}"),
            format!(" {id}"),
        ] {
            assert!(parse_file_id(&raw).is_none(), "{raw}");
        }
    }
}
