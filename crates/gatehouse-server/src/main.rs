use std::env;

use gatehouse_directory::SeedAdmin;
use gatehouse_server::config::loader::load_config;
use gatehouse_server::{GatehouseServer, build_app, build_state, create_cache_backend};

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From GATEHOUSE_CONFIG environment variable
    EnvironmentVariable,
    /// Default path (gatehouse.toml)
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (GATEHOUSE_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist - it's optional
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    gatehouse_server::observability::init_tracing();

    let (config_path, source) = resolve_config_path();

    let cfg = match load_config(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path,
        source = %source,
        "Configuration loaded"
    );

    gatehouse_server::observability::apply_logging_level(&cfg.logging.level);

    if !cfg.auth.has_secret() {
        tracing::warn!(
            "auth.secret is empty; every token operation will fail until it is configured"
        );
    }

    let cache = create_cache_backend(&cfg.redis, &cfg.cache).await;

    let state = match build_state(&cfg, cache) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Server initialization failed: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        services = state.registry.len(),
        prefix = %cfg.server.api_prefix,
        "Service registry initialized"
    );

    if cfg.bootstrap.seed_admin {
        let seed = cfg
            .bootstrap
            .admin_user
            .as_ref()
            .map(|admin| SeedAdmin {
                username: admin.username.clone(),
                email: admin.email.clone(),
                password: admin.password.clone(),
            })
            .unwrap_or_default();
        if let Err(e) = state.directory.ensure_seed_admin(&seed).await {
            eprintln!("Admin bootstrap failed: {e}");
            std::process::exit(2);
        }
    }

    let addr = cfg.addr();
    let app = build_app(&cfg, state);

    if let Err(err) = GatehouseServer::new(addr, app).run().await {
        eprintln!("Server error: {err}");
    }
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: GATEHOUSE_CONFIG
/// 3. Default: gatehouse.toml
fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return (path, ConfigSource::CliArgument);
            }
        }
    }

    if let Ok(path) = env::var("GATEHOUSE_CONFIG") {
        if !path.is_empty() {
            return (path, ConfigSource::EnvironmentVariable);
        }
    }

    ("gatehouse.toml".to_string(), ConfigSource::Default)
}
