//! Field validation for auth request bodies.
//!
//! Violations accumulate into the `{errors:[{msg,param,location}]}` body
//! instead of stopping at the first failure.

use gatehouse_core::{FieldError, UserRole};
use serde::Deserialize;

use crate::error::GatewayError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Defaults to "user" when absent.
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Validates a registration request, returning the resolved role.
pub fn validate_register(req: &RegisterRequest) -> Result<UserRole, GatewayError> {
    let mut errors = Vec::new();

    let username = req.username.trim();
    if username.len() < 3 || username.len() > 30 {
        errors.push(FieldError::body(
            "username",
            "Username must be between 3 and 30 characters",
        ));
    }
    if !is_valid_email(&req.email) {
        errors.push(FieldError::body("email", "Must be a valid email address"));
    }
    if req.password.len() < 6 {
        errors.push(FieldError::body(
            "password",
            "Password must be at least 6 characters",
        ));
    }

    let role = match req.role.as_deref() {
        None | Some("") => Some(UserRole::User),
        Some(raw) => {
            let parsed = UserRole::parse(raw);
            if parsed.is_none() {
                errors.push(FieldError::body("role", "Role must be either user or admin"));
            }
            parsed
        }
    };

    if errors.is_empty() {
        // `role` is always Some here: a parse failure pushed an error.
        Ok(role.unwrap_or_default())
    } else {
        Err(GatewayError::Validation(errors))
    }
}

/// Validates a login request.
pub fn validate_login(req: &LoginRequest) -> Result<(), GatewayError> {
    let mut errors = Vec::new();
    if !is_valid_email(&req.email) {
        errors.push(FieldError::body("email", "Must be a valid email address"));
    }
    if req.password.is_empty() {
        errors.push(FieldError::body("password", "Password is required"));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(GatewayError::Validation(errors))
    }
}

/// Minimal structural email check: one `@`, non-empty local part, and a
/// dotted domain. Full RFC validation is the identity provider's job,
/// not the gateway's.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || email.contains(char::is_whitespace) {
        return false;
    }
    match domain.split_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
