//! Gateway-level errors and their HTTP representations.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gatehouse_core::{ErrorBody, FieldError};
use gatehouse_directory::DirectoryError;

/// Errors surfaced by gateway handlers and the proxy engine.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request body failed field validation.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// Unknown email or wrong password. Deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The addressed record does not exist.
    #[error("Resource not found")]
    NotFound,

    /// A record with the same email or username already exists.
    #[error(transparent)]
    Duplicate(DirectoryError),

    /// Token handling failed.
    #[error(transparent)]
    Auth(#[from] gatehouse_auth::AuthError),

    /// The downstream service refused the connection.
    #[error("Service {service} is unavailable")]
    ServiceUnavailable {
        /// Route name of the service.
        service: String,
    },

    /// The downstream service did not answer within its timeout.
    #[error("Service {service} timed out")]
    ServiceTimeout {
        /// Route name of the service.
        service: String,
    },

    /// Any other transport-level proxy failure.
    #[error("Proxy error for service {service}: {message}")]
    Proxy {
        /// Route name of the service.
        service: String,
        /// Description of the failure. Never sent to clients.
        message: String,
    },

    /// Storage or other unexpected internal failure.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the failure. Never sent to clients.
        message: String,
    },
}

impl GatewayError {
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn proxy(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Proxy {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Returns the stable wire-level error code.
    #[must_use]
    pub fn wire_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::InvalidCredentials => "InvalidCredentialsError",
            Self::NotFound => "NotFoundError",
            Self::Duplicate(e) => e.wire_code(),
            Self::Auth(e) => e.wire_code(),
            Self::ServiceUnavailable { .. } => "ServiceUnavailable",
            Self::ServiceTimeout { .. } => "ServiceTimeout",
            Self::Proxy { .. } => "InternalProxyError",
            Self::Internal { .. } => "InternalError",
        }
    }

    fn status(&self) -> StatusCode {
        use gatehouse_auth::AuthError;
        match self {
            Self::Validation(_) | Self::Duplicate(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Auth(e) => match e {
                AuthError::MissingToken
                | AuthError::Unauthenticated
                | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::InvalidToken { .. }
                | AuthError::TokenExpired
                | AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
                AuthError::Configuration { .. } | AuthError::Internal { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::ServiceTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::Proxy { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DirectoryError> for GatewayError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::DuplicateEmail | DirectoryError::DuplicateUsername => {
                Self::Duplicate(e)
            }
            DirectoryError::Auth(inner) => Self::Auth(inner),
            DirectoryError::Storage { message } => Self::Internal { message },
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            // The auth crate already renders its own body shape.
            Self::Auth(e) => e.into_response(),
            Self::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "errors": errors })),
            )
                .into_response(),
            other => {
                let status = other.status();
                // Server-side details stay in the logs.
                let body = match &other {
                    Self::ServiceUnavailable { service } => ErrorBody::new(other.wire_code())
                        .with_service(service)
                        .with_message("Service temporarily unavailable"),
                    Self::ServiceTimeout { service } => ErrorBody::new(other.wire_code())
                        .with_service(service)
                        .with_message("Service did not respond in time"),
                    Self::Proxy { service, message } => {
                        tracing::error!(service = %service, error = %message, "proxy failure");
                        ErrorBody::new(other.wire_code())
                            .with_service(service)
                            .with_message("Proxy request failed")
                    }
                    Self::Internal { message } => {
                        tracing::error!(error = %message, "internal error");
                        ErrorBody::new(other.wire_code()).with_message("Internal server error")
                    }
                    _ => ErrorBody::new(other.wire_code()).with_message(other.to_string()),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes_and_statuses() {
        let cases = [
            (GatewayError::InvalidCredentials, "InvalidCredentialsError", 401),
            (GatewayError::NotFound, "NotFoundError", 404),
            (
                GatewayError::ServiceUnavailable {
                    service: "users".into(),
                },
                "ServiceUnavailable",
                503,
            ),
            (
                GatewayError::ServiceTimeout {
                    service: "users".into(),
                },
                "ServiceTimeout",
                504,
            ),
            (
                GatewayError::proxy("users", "boom"),
                "InternalProxyError",
                500,
            ),
            (GatewayError::internal("db down"), "InternalError", 500),
        ];
        for (err, code, status) in cases {
            assert_eq!(err.wire_code(), code);
            assert_eq!(err.status().as_u16(), status);
        }
    }

    #[test]
    fn duplicates_are_bad_request() {
        let err: GatewayError = DirectoryError::DuplicateEmail.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.wire_code(), "DuplicateEmailError");
    }

    #[test]
    fn storage_errors_become_internal() {
        let err: GatewayError = DirectoryError::storage("redis exploded").into();
        assert_eq!(err.wire_code(), "InternalError");
    }
}
