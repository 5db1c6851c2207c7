//! Role authorization.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use gatehouse_core::UserRole;

use crate::error::AuthError;
use crate::token::Claims;

use super::auth::{AuthState, BearerAuth};

/// Checks an identity claim against a fixed set of allowed roles.
///
/// `None` means the authentication stage never ran (or failed open):
/// 401 `UnauthenticatedError`. A claim whose role is outside the allowed
/// set yields 403 `ForbiddenError`.
///
/// # Errors
///
/// Returns `AuthError::Unauthenticated` or `AuthError::Forbidden`.
pub fn authorize_roles(claims: Option<&Claims>, allowed: &[UserRole]) -> Result<(), AuthError> {
    let claims = claims.ok_or(AuthError::Unauthenticated)?;
    if !allowed.contains(&claims.role) {
        return Err(AuthError::forbidden("insufficient permissions"));
    }
    Ok(())
}

/// Extractor for admin-only endpoints.
///
/// Runs [`BearerAuth`] first, then role authorization, so the role check
/// never executes without authentication on the same request.
#[derive(Debug, Clone)]
pub struct AdminAuth(pub Claims);

impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerAuth(claims) = BearerAuth::from_request_parts(parts, state).await?;

        if let Err(e) = authorize_roles(Some(&claims), &[UserRole::Admin]) {
            tracing::debug!(
                user_id = %claims.id,
                role = %claims.role,
                "admin access denied"
            );
            return Err(e);
        }

        Ok(Self(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: UserRole) -> Claims {
        Claims {
            id: "u1".into(),
            email: "a@x.com".into(),
            role,
            exp: i64::MAX,
        }
    }

    #[test]
    fn no_claims_is_unauthenticated() {
        let err = authorize_roles(None, &[UserRole::Admin]).unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[test]
    fn role_outside_set_is_forbidden() {
        let c = claims(UserRole::User);
        let err = authorize_roles(Some(&c), &[UserRole::Admin]).unwrap_err();
        assert!(matches!(err, AuthError::Forbidden { .. }));
    }

    #[test]
    fn role_in_set_passes() {
        let admin = claims(UserRole::Admin);
        assert!(authorize_roles(Some(&admin), &[UserRole::Admin]).is_ok());

        let user = claims(UserRole::User);
        assert!(authorize_roles(Some(&user), &[UserRole::User, UserRole::Admin]).is_ok());
    }
}
