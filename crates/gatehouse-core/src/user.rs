//! User records and roles.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Role assigned to a user account.
///
/// Exactly two roles exist; no other role string is valid at
/// authorization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular authenticated user.
    #[default]
    User,
    /// Administrator with access to user management endpoints.
    Admin,
}

impl UserRole {
    /// Returns the role name as it appears on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Parses a role from its wire representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored user record, including the password hash.
///
/// Never serialized directly into an HTTP response; handlers go through
/// [`PublicUser`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned opaque identifier.
    pub id: String,
    /// Unique username.
    pub username: String,
    /// Unique email, stored lowercased.
    pub email: String,
    /// Argon2id PHC hash of the password.
    pub password_hash: String,
    /// Assigned role.
    pub role: UserRole,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    /// Creates a new record with a fresh id and the current timestamp.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.into(),
            email: email.into().to_lowercase(),
            password_hash: password_hash.into(),
            role,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Returns the public projection without the password hash.
    #[must_use]
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Public projection of a user record. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trip() {
        assert_eq!(UserRole::parse("user"), Some(UserRole::User));
        assert_eq!(UserRole::parse("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("root"), None);
        assert_eq!(UserRole::Admin.as_str(), "admin");
    }

    #[test]
    fn new_user_lowercases_email() {
        let user = User::new("alice", "Alice@Example.COM", "$argon2id$x", UserRole::User);
        assert_eq!(user.email, "alice@example.com");
        assert!(!user.id.is_empty());
    }

    #[test]
    fn public_projection_has_no_hash() {
        let user = User::new("alice", "a@x.com", "$argon2id$secret", UserRole::User);
        let json = serde_json::to_value(user.to_public()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
        assert_eq!(json["role"], "user");
    }
}
