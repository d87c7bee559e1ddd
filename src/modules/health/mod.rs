use axum::routing::get;
use axum::Router;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

pub mod handler;

#[derive(Debug, Serialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::root))
        .route("/health", get(handler::health))
}
