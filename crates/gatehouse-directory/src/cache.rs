//! TTL key-value cache backend.
//!
//! Three modes:
//!
//! - **Disabled**: no caching; every lookup goes to the store.
//! - **Local**: single-instance in-process cache (DashMap with per-entry
//!   TTL).
//! - **Redis**: shared cache over a deadpool connection pool.
//!
//! All operations are best-effort: a Redis failure is logged and treated
//! as a miss (get) or a no-op (set/delete). Errors never reach callers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use deadpool_redis::Pool;
use redis::AsyncCommands;

/// A locally cached entry with TTL support.
#[derive(Clone, Debug)]
pub struct CachedEntry {
    value: String,
    cached_at: Instant,
    ttl: Duration,
}

impl CachedEntry {
    /// Create a new cached entry.
    #[must_use]
    pub fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            cached_at: Instant::now(),
            ttl,
        }
    }

    /// Check if this entry has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }
}

/// Cache backend for the user directory.
#[derive(Clone)]
pub enum CacheBackend {
    /// No caching; lookups always hit the store.
    Disabled,

    /// Single-instance: local DashMap only.
    Local(Arc<DashMap<String, CachedEntry>>),

    /// Shared Redis cache.
    Redis(Pool),
}

impl CacheBackend {
    /// Creates a disabled backend.
    #[must_use]
    pub fn disabled() -> Self {
        CacheBackend::Disabled
    }

    /// Creates a local in-process backend.
    #[must_use]
    pub fn new_local() -> Self {
        CacheBackend::Local(Arc::new(DashMap::new()))
    }

    /// Creates a Redis-backed cache.
    #[must_use]
    pub fn new_redis(pool: Pool) -> Self {
        CacheBackend::Redis(pool)
    }

    /// Returns `true` if this backend actually caches.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !matches!(self, CacheBackend::Disabled)
    }

    /// Get a cached value.
    ///
    /// Returns `None` on a miss, on an expired entry, and on any cache
    /// error (logged, never propagated).
    pub async fn get(&self, key: &str) -> Option<String> {
        match self {
            CacheBackend::Disabled => None,
            CacheBackend::Local(map) => {
                if let Some(entry) = map.get(key) {
                    if !entry.is_expired() {
                        tracing::debug!(key = %key, "cache hit");
                        return Some(entry.value.clone());
                    }
                    drop(entry);
                    map.remove(key);
                }
                tracing::debug!(key = %key, "cache miss");
                None
            }
            CacheBackend::Redis(pool) => match pool.get().await {
                Ok(mut conn) => match conn.get::<_, Option<String>>(key).await {
                    Ok(Some(value)) => {
                        tracing::debug!(key = %key, "cache hit");
                        Some(value)
                    }
                    Ok(None) => {
                        tracing::debug!(key = %key, "cache miss");
                        None
                    }
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "redis GET error");
                        None
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "failed to get redis connection");
                    None
                }
            },
        }
    }

    /// Set a value with TTL. Best-effort; failures are logged.
    pub async fn set(&self, key: &str, value: String, ttl: Duration) {
        match self {
            CacheBackend::Disabled => {}
            CacheBackend::Local(map) => {
                map.insert(key.to_string(), CachedEntry::new(value, ttl));
            }
            CacheBackend::Redis(pool) => match pool.get().await {
                Ok(mut conn) => {
                    if let Err(e) = conn
                        .set_ex::<_, _, ()>(key, value, ttl.as_secs())
                        .await
                    {
                        tracing::warn!(key = %key, error = %e, "redis SET error");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to get redis connection");
                }
            },
        }
    }

    /// Remove a set of keys. Best-effort; failures are logged.
    pub async fn delete(&self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        match self {
            CacheBackend::Disabled => {}
            CacheBackend::Local(map) => {
                for key in keys {
                    map.remove(key);
                }
            }
            CacheBackend::Redis(pool) => match pool.get().await {
                Ok(mut conn) => {
                    if let Err(e) = conn.del::<_, ()>(keys).await {
                        tracing::warn!(error = %e, "redis DEL error");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to get redis connection");
                }
            },
        }
    }
}

impl std::fmt::Debug for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => f.write_str("CacheBackend::Disabled"),
            Self::Local(map) => write!(f, "CacheBackend::Local({} entries)", map.len()),
            Self::Redis(_) => f.write_str("CacheBackend::Redis"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_never_stores() {
        let cache = CacheBackend::disabled();
        cache.set("k", "v".into(), Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn local_get_set_delete() {
        let cache = CacheBackend::new_local();
        cache.set("k", "v".into(), Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some("v".to_string()));

        cache.delete(&["k".to_string()]).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn local_entries_expire() {
        let cache = CacheBackend::new_local();
        cache.set("k", "v".into(), Duration::from_millis(50)).await;
        assert!(cache.get("k").await.is_some());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn delete_ignores_missing_keys() {
        let cache = CacheBackend::new_local();
        cache.delete(&["absent".to_string()]).await;
        cache.delete(&[]).await;
    }
}
