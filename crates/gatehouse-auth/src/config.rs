//! Authentication configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Authentication settings consumed by the token codec and middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC signing secret for session tokens.
    ///
    /// An empty secret leaves the gateway able to start but every
    /// token operation fails with a configuration error (surfaced as 500).
    #[serde(default)]
    pub secret: String,

    /// Session token lifetime in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

fn default_token_ttl_secs() -> u64 {
    86_400 // 24h
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

impl AuthConfig {
    /// Returns the configured token lifetime.
    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    /// Returns `true` if a signing secret is present.
    #[must_use]
    pub fn has_secret(&self) -> bool {
        !self.secret.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttl_is_24h() {
        let cfg = AuthConfig::default();
        assert_eq!(cfg.token_ttl(), Duration::from_secs(86_400));
        assert!(!cfg.has_secret());
    }
}
