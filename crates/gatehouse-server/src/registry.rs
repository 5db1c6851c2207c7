//! Static registry of downstream services.
//!
//! Built once from configuration at startup and read-only thereafter.
//! Route registration walks the registry, so a request can only ever
//! reach the proxy engine with a descriptor that validated at boot.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::ServiceConfig;

/// Resolved routing entry for one downstream service.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    /// Route name, the path segment the service is mounted under.
    pub name: String,
    /// Absolute base URL of the service, without a trailing slash.
    pub base_url: String,
    /// Prefix prepended on the upstream side.
    pub path_prefix: String,
    /// Gateway-side mount prefix, e.g. "/api/v1/accounts".
    pub mount_prefix: String,
    /// Strip `mount_prefix` from the forwarded path.
    pub strip_prefix: bool,
    /// Per-request timeout.
    pub timeout: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, ServiceDescriptor>,
}

impl ServiceRegistry {
    /// Builds the registry from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid entry. Config-level
    /// validation normally catches these earlier; the check here keeps
    /// the registry safe to build from any source.
    pub fn from_config(
        api_prefix: &str,
        services: &BTreeMap<String, ServiceConfig>,
    ) -> Result<Self, String> {
        let mut resolved = BTreeMap::new();
        for (name, cfg) in services {
            cfg.validate().map_err(|e| format!("service {name:?}: {e}"))?;
            let descriptor = ServiceDescriptor {
                name: name.clone(),
                base_url: cfg.url.trim_end_matches('/').to_string(),
                path_prefix: cfg.path_prefix.clone(),
                mount_prefix: format!("{api_prefix}/{name}"),
                strip_prefix: cfg.strip_prefix,
                timeout: cfg.timeout(),
            };
            resolved.insert(name.clone(), descriptor);
        }
        Ok(Self { services: resolved })
    }

    pub fn get(&self, name: &str) -> Option<&ServiceDescriptor> {
        self.services.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }
}
