use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{error, info};

use super::dto::{CleanupResponse, RemovalResponse};
use super::service::{download_name, parse_file_id, RemovalService, ALLOWED_EXTENSIONS};
use crate::common::response::{ApiError, ApiSuccess, ErrorResponse};
use crate::common::upload::read_image;
use crate::modules::background::error::RemovalError;
use crate::state::AppState;

/// Remove the background of an uploaded image
///
/// Expects a multipart form with a `file` field (JPG or PNG).
#[utoipa::path(
    post,
    path = "/remove-background",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Background removed", body = RemovalResponse),
        (status = 400, description = "Not an image or unsupported extension", body = ErrorResponse),
        (status = 500, description = "Processing failed", body = ErrorResponse)
    ),
    tag = "Background"
)]
pub async fn remove_background(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let upload = match read_image(&mut multipart, "file", ALLOWED_EXTENSIONS).await {
        Ok(u) => u,
        Err(e) => {
            info!("Rejected upload: {}", e);
            return ApiError::from(RemovalError::from(e)).into_response();
        }
    };

    match RemovalService::remove_background(state, upload).await {
        Ok(file_id) => ApiSuccess(
            RemovalResponse {
                success: true,
                file_id: file_id.to_string(),
                message: "Background removed successfully".to_string(),
            },
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Download a processed image
#[utoipa::path(
    get,
    path = "/download/{file_id}",
    params(
        ("file_id" = String, Path, description = "File ID returned by /remove-background")
    ),
    responses(
        (status = 200, description = "PNG with transparent background", content_type = "image/png", body = Vec<u8>),
        (status = 404, description = "File not found", body = ErrorResponse)
    ),
    tag = "Background"
)]
pub async fn download(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> impl IntoResponse {
    let Some(id) = parse_file_id(&file_id) else {
        return ApiError("File not found".to_string(), StatusCode::NOT_FOUND).into_response();
    };

    match RemovalService::open_result(state, id).await {
        Ok(Some(blob)) => {
            let mut builder = Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime::IMAGE_PNG.as_ref())
                .header(
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", download_name(id)),
                );

            if let Some(size) = blob.size {
                builder = builder.header(header::CONTENT_LENGTH, size);
            }

            builder
                .body(Body::from_stream(blob.stream))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        Ok(None) => ApiError("File not found".to_string(), StatusCode::NOT_FOUND).into_response(),
        Err(e) => {
            error!("Failed to open result {}: {}", id, e);
            ApiError(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response()
        }
    }
}

/// Delete a processed image
///
/// Unknown ids are not an error.
#[utoipa::path(
    delete,
    path = "/cleanup/{file_id}",
    params(
        ("file_id" = String, Path, description = "File ID returned by /remove-background")
    ),
    responses(
        (status = 200, description = "`deleted` or `not found`", body = CleanupResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "Background"
)]
pub async fn cleanup(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> impl IntoResponse {
    let existed = match parse_file_id(&file_id) {
        Some(id) => match RemovalService::delete_result(state, id).await {
            Ok(existed) => existed,
            Err(e) => {
                error!("Failed to delete result {}: {}", id, e);
                return ApiError(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response();
            }
        },
        None => false,
    };

    let message = if existed { "deleted" } else { "not found" };
    ApiSuccess(
        CleanupResponse {
            message: message.to_string(),
        },
        StatusCode::OK,
    )
    .into_response()
}
