//! Authentication and authorization for the Gatehouse API gateway.
//!
//! This crate provides:
//!
//! - The session token codec ([`token::TokenCodec`]) — HS256-signed claims
//!   carrying the caller's id, email, and role.
//! - Password hashing ([`password`]) — Argon2id with random salts.
//! - Request middleware ([`middleware`]) — Axum extractors that validate
//!   bearer tokens and enforce role membership.

pub mod config;
pub mod error;
pub mod middleware;
pub mod password;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use middleware::{AdminAuth, AuthState, BearerAuth, authorize_roles};
pub use token::{Claims, TokenCodec};

/// Result alias used throughout this crate.
pub type AuthResult<T> = Result<T, AuthError>;
