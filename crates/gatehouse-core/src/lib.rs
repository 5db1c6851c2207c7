//! Shared domain types for the Gatehouse API gateway.
//!
//! This crate holds the types that cross crate boundaries: user records,
//! role definitions, and the wire-level error body shapes used by every
//! HTTP-facing component.

pub mod error;
pub mod user;

pub use error::{ErrorBody, FieldError};
pub use user::{PublicUser, User, UserRole};
