use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use gatehouse_auth::config::AuthConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Token signing configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Redis configuration
    #[serde(default)]
    pub redis: RedisConfig,
    /// User cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Bootstrap configuration (initial admin user)
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    /// Downstream services keyed by route name
    #[serde(default)]
    pub services: BTreeMap<String, ServiceConfig>,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if !self.server.api_prefix.starts_with('/') || self.server.api_prefix.ends_with('/') {
            return Err("server.api_prefix must start with '/' and not end with '/'".into());
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        if self.cache.user_ttl_secs == 0 {
            return Err("cache.user_ttl_secs must be > 0".into());
        }
        // Segments already claimed by the gateway's own routes.
        let reserved = ["auth", "users", "profile", "dashboard", "health"];
        for (name, svc) in &self.services {
            if name.is_empty() || name.contains('/') {
                return Err(format!("service name {name:?} must be a single path segment"));
            }
            if reserved.contains(&name.as_str()) {
                return Err(format!("service name {name:?} is reserved"));
            }
            svc.validate()
                .map_err(|e| format!("service {name:?}: {e}"))?;
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }

    pub fn user_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.user_ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Route prefix for the authenticated API surface.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_api_prefix() -> String {
    "/api/v1".into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_prefix: default_api_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Redis configuration for shared caching across instances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Enable Redis (gracefully degrades without it)
    #[serde(default = "default_redis_enabled")]
    pub enabled: bool,

    /// Redis connection URL (e.g., "redis://localhost:6379")
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Connection pool size
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: usize,

    /// Connection timeout in milliseconds
    #[serde(default = "default_redis_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_redis_enabled() -> bool {
    false
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_pool_size() -> usize {
    10
}

fn default_redis_timeout_ms() -> u64 {
    5000
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: default_redis_enabled(),
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
            timeout_ms: default_redis_timeout_ms(),
        }
    }
}

/// User record cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Disable to run every lookup against the store directly
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// User record TTL in seconds
    #[serde(default = "default_user_ttl_secs")]
    pub user_ttl_secs: u64,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_user_ttl_secs() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            user_ttl_secs: default_user_ttl_secs(),
        }
    }
}

/// Bootstrap configuration for initial server setup
///
/// Admin credentials can also be set via environment variables:
/// - GATEHOUSE__BOOTSTRAP__ADMIN_USER__USERNAME
/// - GATEHOUSE__BOOTSTRAP__ADMIN_USER__EMAIL
/// - GATEHOUSE__BOOTSTRAP__ADMIN_USER__PASSWORD
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Create the admin account on startup if it does not exist
    #[serde(default = "default_seed_admin")]
    pub seed_admin: bool,

    /// Override for the admin account credentials
    #[serde(default)]
    pub admin_user: Option<AdminUserConfig>,
}

fn default_seed_admin() -> bool {
    true
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            seed_admin: default_seed_admin(),
            admin_user: None,
        }
    }
}

/// Configuration for bootstrapping an admin user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserConfig {
    pub username: String,
    pub email: String,
    /// Plain text; hashed before storage. Prefer the env var form.
    pub password: String,
}

/// One downstream service behind the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Absolute base URL of the service, e.g. "http://localhost:3001"
    pub url: String,

    /// Prefix prepended on the upstream side, e.g. "/internal"
    #[serde(default)]
    pub path_prefix: String,

    /// Strip the gateway-side mount prefix from the forwarded path
    #[serde(default = "default_strip_prefix")]
    pub strip_prefix: bool,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_service_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_strip_prefix() -> bool {
    true
}

fn default_service_timeout_ms() -> u64 {
    30_000
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), String> {
        let parsed = url::Url::parse(&self.url).map_err(|e| format!("invalid url: {e}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(format!("url scheme must be http or https, got {:?}", parsed.scheme()));
        }
        if parsed.host_str().is_none() {
            return Err("url must have a host".into());
        }
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be > 0".into());
        }
        if !self.path_prefix.is_empty() && !self.path_prefix.starts_with('/') {
            return Err("path_prefix must start with '/'".into());
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if pathbuf.exists() {
                    builder = builder.add_source(File::from(pathbuf));
                }
            }
            None => {
                let default_path = PathBuf::from("gatehouse.toml");
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., GATEHOUSE__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("GATEHOUSE")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
