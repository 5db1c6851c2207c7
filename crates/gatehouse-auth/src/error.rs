//! Authentication and authorization error types.

/// Errors that can occur during authentication and authorization.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer token was supplied, or the authorization header is
    /// malformed (missing `Bearer ` prefix, empty token).
    #[error("Missing access token")]
    MissingToken,

    /// The token failed signature verification or is structurally invalid.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Description of why the token is invalid.
        message: String,
    },

    /// The token's expiration timestamp has passed.
    #[error("Token expired")]
    TokenExpired,

    /// Role authorization ran without an authenticated identity.
    #[error("Authentication required")]
    Unauthenticated,

    /// The authenticated identity lacks a required role.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Description of the missing permission.
        message: String,
    },

    /// Login credentials did not match a known account.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The auth configuration is invalid (e.g. empty signing secret).
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidToken` error.
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Creates a new `Forbidden` error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !self.is_server_error()
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::Internal { .. })
    }

    /// Returns `true` if this is a token-related error the client can fix
    /// by re-authenticating.
    #[must_use]
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::MissingToken | Self::InvalidToken { .. } | Self::TokenExpired
        )
    }

    /// Returns the stable wire-level error code for this error.
    #[must_use]
    pub fn wire_code(&self) -> &'static str {
        match self {
            Self::MissingToken => "MissingTokenError",
            Self::InvalidToken { .. } | Self::TokenExpired => "InvalidTokenError",
            Self::Unauthenticated => "UnauthenticatedError",
            Self::Forbidden { .. } => "ForbiddenError",
            Self::InvalidCredentials => "InvalidCredentialsError",
            Self::Configuration { .. } => "ConfigurationError",
            Self::Internal { .. } => "InternalError",
        }
    }
}
