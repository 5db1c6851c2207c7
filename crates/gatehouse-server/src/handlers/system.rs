//! Health and fallback handlers.

use axum::{Json, http::StatusCode, response::IntoResponse};
use gatehouse_core::ErrorBody;
use serde_json::json;

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "Gateway is running",
    }))
}

/// Catch-all for unmatched routes.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new("NotFoundError").with_message("Route not found")),
    )
}
