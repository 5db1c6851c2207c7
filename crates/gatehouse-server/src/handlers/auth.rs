//! Registration, login, and identity endpoints.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use gatehouse_auth::middleware::BearerAuth;
use serde_json::json;
use tracing::info;

use crate::error::GatewayError;
use crate::server::AppState;
use crate::validation::{LoginRequest, RegisterRequest, validate_login, validate_register};

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let role = validate_register(&req)?;

    let user = state
        .directory
        .create(req.username.trim(), &req.email, &req.password, role)
        .await?;
    let token = state.auth.codec.encode(&user.id, &user.email, user.role)?;

    info!(user_id = %user.id, "registration completed");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user": user,
            "token": token,
        })),
    ))
}

/// `POST /auth/login`
///
/// Unknown email and wrong password answer identically so the endpoint
/// cannot be used to probe which emails exist.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    validate_login(&req)?;

    let user = state
        .directory
        .find_by_email(&req.email)
        .await?
        .ok_or(GatewayError::InvalidCredentials)?;

    let matches = state
        .directory
        .verify_password(&req.password, &user.password_hash)
        .await?;
    if !matches {
        return Err(GatewayError::InvalidCredentials);
    }

    let token = state.auth.codec.encode(&user.id, &user.email, user.role)?;

    info!(user_id = %user.id, "login completed");
    Ok(Json(json!({
        "message": "Login successful",
        "user": user.to_public(),
        "token": token,
    })))
}

/// `GET /auth/me`
pub async fn me(
    State(state): State<AppState>,
    BearerAuth(claims): BearerAuth,
) -> Result<impl IntoResponse, GatewayError> {
    let user = state
        .directory
        .find_by_id(&claims.id)
        .await?
        .ok_or(GatewayError::NotFound)?;

    Ok(Json(json!({ "user": user.to_public() })))
}
