//! User directory error types.

/// Errors that can occur during user directory operations.
///
/// Cache failures never appear here: the cache layer swallows and logs
/// its own errors and degrades to a miss.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// A record with the given email already exists (case-insensitive).
    #[error("A user with this email already exists")]
    DuplicateEmail,

    /// A record with the given username already exists.
    #[error("A user with this username already exists")]
    DuplicateUsername,

    /// The persistent store failed.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
    },

    /// Password hashing or verification failed.
    #[error(transparent)]
    Auth(#[from] gatehouse_auth::AuthError),
}

impl DirectoryError {
    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a duplicate-record error (client should
    /// retry with different data).
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateEmail | Self::DuplicateUsername)
    }

    /// Returns the stable wire-level error code for this error.
    #[must_use]
    pub fn wire_code(&self) -> &'static str {
        match self {
            Self::DuplicateEmail => "DuplicateEmailError",
            Self::DuplicateUsername => "DuplicateUsernameError",
            Self::Storage { .. } => "InternalError",
            Self::Auth(e) => e.wire_code(),
        }
    }
}
