use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

pub mod dto;
pub mod error;
pub mod handler;
pub mod service;
pub mod staging;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/remove-background", post(handler::remove_background))
        .route("/download/{file_id}", get(handler::download))
        .route("/cleanup/{file_id}", delete(handler::cleanup))
}
