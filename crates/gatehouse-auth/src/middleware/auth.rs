//! Bearer token authentication extractor.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use gatehouse_auth::middleware::BearerAuth;
//!
//! async fn protected_handler(BearerAuth(claims): BearerAuth) -> String {
//!     format!("Hello, {}!", claims.email)
//! }
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .with_state(auth_state);
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AuthError;
use crate::token::{Claims, TokenCodec};

/// State required for bearer token authentication.
///
/// Include this in application state and expose it to the extractors via
/// `FromRef`.
#[derive(Clone)]
pub struct AuthState {
    /// Token codec for validation.
    pub codec: Arc<TokenCodec>,
}

impl AuthState {
    /// Creates a new auth state.
    #[must_use]
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }
}

/// Axum extractor that validates bearer tokens.
///
/// Processing order, terminal at the first failure:
///
/// 1. Missing or malformed `Authorization: Bearer <token>` header
///    → 401 `MissingTokenError`.
/// 2. Signing secret not configured → 500 `ConfigurationError`
///    (server misconfiguration, checked per request).
/// 3. Decode failure (signature, structure, expiry) → 403
///    `InvalidTokenError`.
/// 4. Success: the identity claim is attached to the request.
pub struct BearerAuth(pub Claims);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        if !auth_state.codec.is_configured() {
            tracing::error!("bearer auth attempted without a configured signing secret");
            return Err(AuthError::configuration("signing secret is not set"));
        }

        let claims = auth_state.codec.decode(token).map_err(|e| {
            tracing::debug!(error = %e, "token validation failed");
            e
        })?;

        tracing::debug!(user_id = %claims.id, role = %claims.role, "token validated");
        Ok(BearerAuth(claims))
    }
}
