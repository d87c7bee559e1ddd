use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    crate::routes::configure_routes(&state.config)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
