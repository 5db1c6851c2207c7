//! Session token encoding and decoding.
//!
//! Tokens are compact JWTs signed with HS256 over a shared secret. The
//! payload carries the caller's identity claim (`id`, `email`, `role`)
//! plus the standard `exp` timestamp; tampering or forgery without the
//! secret fails signature verification on decode.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;

use gatehouse_core::UserRole;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Identity claim carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id (store-assigned, opaque).
    pub id: String,
    /// User email at issue time.
    pub email: String,
    /// User role at issue time.
    pub role: UserRole,
    /// Expiration as a unix timestamp.
    pub exp: i64,
}

/// Encodes and decodes signed session tokens.
///
/// Thread-safe (`Send + Sync`); constructed once from [`AuthConfig`] and
/// shared across request tasks.
pub struct TokenCodec {
    secret: String,
    ttl: Duration,
}

impl TokenCodec {
    /// Creates a codec from auth configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            ttl: config.token_ttl(),
        }
    }

    /// Creates a codec from raw parts. Mostly useful in tests.
    #[must_use]
    pub fn from_parts(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Returns `true` if a signing secret is configured.
    ///
    /// Checked per request by the middleware: an unconfigured secret is a
    /// server misconfiguration (500), not a client error.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Signs an identity claim into a token string.
    ///
    /// The expiration is computed from the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the signing secret is empty,
    /// or `AuthError::Internal` if encoding fails.
    pub fn encode(
        &self,
        id: impl Into<String>,
        email: impl Into<String>,
        role: UserRole,
    ) -> Result<String, AuthError> {
        if !self.is_configured() {
            return Err(AuthError::configuration("signing secret is not set"));
        }

        let exp = OffsetDateTime::now_utc().unix_timestamp() + self.ttl.as_secs() as i64;
        let claims = Claims {
            id: id.into(),
            email: email.into(),
            role,
            exp,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::internal(format!("token encoding failed: {e}")))
    }

    /// Verifies a token and returns its identity claim.
    ///
    /// Pure function with no side effects: the only inputs are the token
    /// string, the secret, and the clock.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the secret is empty,
    /// `AuthError::TokenExpired` if `exp` has passed, and
    /// `AuthError::InvalidToken` for any signature or structure failure.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        if !self.is_configured() {
            return Err(AuthError::configuration("signing secret is not set"));
        }

        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::invalid_token(e.to_string()),
        })?;

        Ok(data.claims)
    }
}
