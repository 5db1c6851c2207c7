pub mod config;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod proxy;
pub mod registry;
pub mod server;
pub mod validation;

pub use config::{AppConfig, CacheConfig, RedisConfig, ServerConfig, ServiceConfig};
pub use error::GatewayError;
pub use observability::init_tracing;
pub use registry::{ServiceDescriptor, ServiceRegistry};
pub use server::{AppState, GatehouseServer, build_app, build_state};

use gatehouse_directory::CacheBackend;

/// Create a cache backend based on configuration.
///
/// ## Cache Modes
///
/// - **Cache disabled**: every lookup goes straight to the store
/// - **Redis disabled**: local-only cache (DashMap)
/// - **Redis enabled**: attempts to connect to Redis, falls back to
///   local on failure
///
/// ## Graceful Degradation
///
/// If the Redis connection fails, the gateway falls back to local-only
/// mode so it can start and run without Redis.
pub async fn create_cache_backend(
    redis: &config::RedisConfig,
    cache: &config::CacheConfig,
) -> CacheBackend {
    use std::time::Duration;

    if !cache.enabled {
        tracing::info!("user cache disabled, lookups go straight to the store");
        return CacheBackend::disabled();
    }

    if !redis.enabled {
        tracing::info!("Redis disabled, using local cache only");
        return CacheBackend::new_local();
    }

    tracing::info!(url = %redis.url, "Connecting to Redis");

    let mut redis_config = deadpool_redis::Config::from_url(&redis.url);
    if let Some(ref mut pool_config) = redis_config.pool {
        pool_config.max_size = redis.pool_size;
        pool_config.timeouts.wait = Some(Duration::from_millis(redis.timeout_ms));
        pool_config.timeouts.create = Some(Duration::from_millis(redis.timeout_ms));
        pool_config.timeouts.recycle = Some(Duration::from_millis(redis.timeout_ms));
    }

    let pool = match redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1)) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to create Redis pool. Falling back to local cache."
            );
            return CacheBackend::new_local();
        }
    };

    match pool.get().await {
        Ok(_) => {
            tracing::info!("Connected to Redis");
            CacheBackend::new_redis(pool)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to connect to Redis. Falling back to local cache."
            );
            CacheBackend::new_local()
        }
    }
}
