use utoipa::OpenApi;

use crate::common::response::ErrorResponse;
use crate::modules::background::dto::{CleanupResponse, RemovalResponse};
use crate::modules::health::{HealthResponse, RootResponse};

#[derive(OpenApi)]
#[openapi(
    info(title = "Background Removal API", version = "1.0.0"),
    paths(
        crate::modules::health::handler::root,
        crate::modules::health::handler::health,
        crate::modules::background::handler::remove_background,
        crate::modules::background::handler::download,
        crate::modules::background::handler::cleanup,
    ),
    components(
        schemas(
            RootResponse, HealthResponse,
            RemovalResponse, CleanupResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness endpoints"),
        (name = "Background", description = "Background removal and result retrieval")
    )
)]
pub struct ApiDoc;
