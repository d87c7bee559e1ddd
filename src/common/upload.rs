use std::path::Path;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart},
    http::StatusCode,
};
use thiserror::Error;
use tracing::info;

/// A validated file taken from a multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    /// Lowercased, including the leading dot.
    pub extension: String,
    pub data: Bytes,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No {0} field found in multipart request")]
    MissingField(String),
    #[error("File must be an image")]
    NotAnImage,
    #[error("Only {} files are supported", .0.join(", "))]
    UnsupportedExtension(Vec<String>),
    #[error("Invalid multipart request: {0}")]
    Multipart(#[from] MultipartError),
}

impl UploadError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UploadError::Multipart(e) => e.status(),
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Extension of `file_name`, lowercased with its dot. Dotfiles have none.
pub fn file_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
}

/// Checks the declared media type and file extension before any bytes are read.
pub fn check_image(
    content_type: Option<&str>,
    file_name: Option<&str>,
    allowed_extensions: &[&str],
) -> Result<String, UploadError> {
    let is_image = content_type
        .and_then(|ct| ct.trim().parse::<mime::Mime>().ok())
        .is_some_and(|m| m.type_() == mime::IMAGE);
    if !is_image {
        return Err(UploadError::NotAnImage);
    }

    file_name
        .and_then(file_extension)
        .filter(|ext| allowed_extensions.contains(&ext.as_str()))
        .ok_or_else(|| {
            UploadError::UnsupportedExtension(allowed_extensions.iter().map(|e| e.to_string()).collect())
        })
}

/// Reads the first `field_name` field of the form as an image upload.
pub async fn read_image(
    multipart: &mut Multipart,
    field_name: &str,
    allowed_extensions: &[&str],
) -> Result<ImageUpload, UploadError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let extension = check_image(content_type.as_deref(), file_name.as_deref(), allowed_extensions)?;

        let data = field.bytes().await?;
        info!("Received {} bytes for {:?}", data.len(), file_name);

        return Ok(ImageUpload {
            file_name: file_name.unwrap_or_default(),
            extension,
            data,
        });
    }

    Err(UploadError::MissingField(field_name.to_string()))
}
