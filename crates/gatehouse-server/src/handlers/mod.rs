//! HTTP handlers for the gateway's own surface.

pub mod auth;
pub mod protected;
pub mod system;
