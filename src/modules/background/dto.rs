use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct RemovalResponse {
    pub success: bool,
    pub file_id: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CleanupResponse {
    /// `deleted` or `not found`
    pub message: String,
}
