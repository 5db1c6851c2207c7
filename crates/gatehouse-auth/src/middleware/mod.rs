//! Request middleware: bearer token validation and role enforcement.
//!
//! Authentication and authorization compose as Axum extractors:
//! [`BearerAuth`] validates the token and yields the identity claim;
//! [`AdminAuth`] runs `BearerAuth` first and then checks role membership,
//! so authorization can never run without authentication on the same
//! request.

mod auth;
mod error;
mod roles;

pub use auth::{AuthState, BearerAuth};
pub use roles::{AdminAuth, authorize_roles};
