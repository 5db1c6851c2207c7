//! Wire-level error body shapes.
//!
//! Every error response from the gateway uses one of two shapes:
//! `{error, service?, message?}` for categorized errors, or
//! `{errors: [{msg, param, location}, ...]}` for request validation.

use serde::{Deserialize, Serialize};

/// Standard error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable error code, e.g. `ServiceUnavailable` or `InvalidTokenError`.
    pub error: String,
    /// Logical service name, set for proxy-layer errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Human-readable detail. Never carries internal stack detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Creates a body with just an error code.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            service: None,
            message: None,
        }
    }

    /// Attaches a human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches the logical service name.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }
}

/// A single request-validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Validation message.
    pub msg: String,
    /// Offending parameter name.
    pub param: String,
    /// Where the parameter came from (always `body` for this surface).
    pub location: String,
}

impl FieldError {
    /// Creates a body-field validation error.
    #[must_use]
    pub fn body(param: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            param: param.into(),
            location: "body".into(),
        }
    }
}
