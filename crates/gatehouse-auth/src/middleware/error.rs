//! Error response handling for the auth middleware.
//!
//! Implements `IntoResponse` for [`AuthError`] so extractors can reject
//! requests with the gateway's `{error, message}` body shape.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use gatehouse_core::ErrorBody;

use crate::error::AuthError;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        // Server-side detail stays in the logs, not in the response body.
        let message = if self.is_server_error() {
            tracing::error!(error = %self, "auth middleware server error");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody::new(self.wire_code()).with_message(message);
        (status, Json(body)).into_response()
    }
}

fn status_for(error: &AuthError) -> StatusCode {
    match error {
        AuthError::MissingToken | AuthError::Unauthenticated | AuthError::InvalidCredentials => {
            StatusCode::UNAUTHORIZED
        }
        AuthError::InvalidToken { .. } | AuthError::TokenExpired | AuthError::Forbidden { .. } => {
            StatusCode::FORBIDDEN
        }
        AuthError::Configuration { .. } | AuthError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
