use axum::{http::StatusCode, response::IntoResponse};

use super::{HealthResponse, RootResponse};
use crate::common::response::ApiSuccess;

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service banner", body = RootResponse)
    ),
    tag = "Health"
)]
pub async fn root() -> impl IntoResponse {
    ApiSuccess(
        RootResponse {
            message: "Background Removal API is running".to_string(),
        },
        StatusCode::OK,
    )
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health() -> impl IntoResponse {
    ApiSuccess(
        HealthResponse {
            status: "healthy".to_string(),
            message: "API is working normally".to_string(),
        },
        StatusCode::OK,
    )
}
