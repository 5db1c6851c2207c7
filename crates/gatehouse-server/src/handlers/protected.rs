//! Authenticated endpoints served by the gateway itself.

use axum::{Json, extract::State, response::IntoResponse};
use gatehouse_auth::middleware::{AdminAuth, BearerAuth};
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::GatewayError;
use crate::server::AppState;

/// `GET /users` (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    AdminAuth(claims): AdminAuth,
) -> Result<impl IntoResponse, GatewayError> {
    tracing::debug!(admin_id = %claims.id, "user listing requested");
    let users = state.directory.list().await?;
    Ok(Json(json!({ "users": users })))
}

/// `GET /profile`
pub async fn profile(
    State(state): State<AppState>,
    BearerAuth(claims): BearerAuth,
) -> Result<impl IntoResponse, GatewayError> {
    let user = state
        .directory
        .find_by_id(&claims.id)
        .await?
        .ok_or(GatewayError::NotFound)?;

    Ok(Json(json!({
        "message": "Profile data",
        "user": user.to_public(),
    })))
}

/// `GET /dashboard`
pub async fn dashboard(BearerAuth(claims): BearerAuth) -> impl IntoResponse {
    let server_time = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();

    Json(json!({
        "message": "Welcome to your dashboard",
        "user": {
            "id": claims.id,
            "email": claims.email,
            "role": claims.role,
        },
        "data": {
            "stats": {
                "role": claims.role,
                "serverTime": server_time,
            },
        },
    }))
}
