//! Cache-aside user directory.
//!
//! Read path: try the cache key for the lookup dimension; on a hit,
//! deserialize and return; on a miss (or any cache error), read the
//! store; on a store hit, populate the cache best-effort and return.
//! Store misses are never cached.
//!
//! Write path (`create`): duplicate pre-checks (cached-or-direct), hash
//! the password off the async runtime, insert into the store (which
//! enforces uniqueness atomically), then invalidate the `users:all`
//! listing key so a fresh record is never masked by a stale listing.

use std::sync::Arc;
use std::time::Duration;

use gatehouse_auth::password;
use gatehouse_core::{PublicUser, User, UserRole};

use crate::DirectoryResult;
use crate::cache::CacheBackend;
use crate::error::DirectoryError;
use crate::store::UserStore;

/// Default TTL for cached user records.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

fn key_id(id: &str) -> String {
    format!("user:id:{id}")
}

fn key_email(email: &str) -> String {
    format!("user:email:{}", email.to_lowercase())
}

fn key_username(username: &str) -> String {
    format!("user:username:{username}")
}

const KEY_ALL: &str = "users:all";

/// Well-known administrator account created by
/// [`UserDirectory::ensure_seed_admin`].
#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Default for SeedAdmin {
    fn default() -> Self {
        Self {
            username: "admin".into(),
            email: "admin@example.com".into(),
            password: "admin123".into(),
        }
    }
}

/// Stateless user directory service.
///
/// Constructed once with its two injected dependencies (store handle,
/// cache handle) and shared across request tasks; no additional locking
/// is needed for reads.
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
    cache: CacheBackend,
    cache_ttl: Duration,
}

impl UserDirectory {
    /// Creates a directory with the default cache TTL.
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, cache: CacheBackend) -> Self {
        Self::with_ttl(store, cache, DEFAULT_CACHE_TTL)
    }

    /// Creates a directory with an explicit cache TTL.
    #[must_use]
    pub fn with_ttl(store: Arc<dyn UserStore>, cache: CacheBackend, cache_ttl: Duration) -> Self {
        Self {
            store,
            cache,
            cache_ttl,
        }
    }

    /// Cache-aside read over one lookup dimension.
    async fn find_cached<F>(&self, cache_key: &str, load: F) -> DirectoryResult<Option<User>>
    where
        F: Future<Output = DirectoryResult<Option<User>>>,
    {
        if let Some(raw) = self.cache.get(cache_key).await {
            match serde_json::from_str::<User>(&raw) {
                Ok(user) => return Ok(Some(user)),
                Err(e) => {
                    // Corrupt entry: drop it and fall through to the store.
                    tracing::warn!(key = %cache_key, error = %e, "discarding undecodable cache entry");
                    self.cache.delete(&[cache_key.to_string()]).await;
                }
            }
        }

        let Some(user) = load.await? else {
            // Negative results are never cached.
            return Ok(None);
        };

        match serde_json::to_string(&user) {
            Ok(raw) => self.cache.set(cache_key, raw, self.cache_ttl).await,
            Err(e) => tracing::warn!(key = %cache_key, error = %e, "failed to serialize cache entry"),
        }
        Ok(Some(user))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> DirectoryResult<Option<User>> {
        self.find_cached(&key_email(email), self.store.find_by_email(email))
            .await
    }

    /// Find a user by id.
    pub async fn find_by_id(&self, id: &str) -> DirectoryResult<Option<User>> {
        self.find_cached(&key_id(id), self.store.find_by_id(id)).await
    }

    /// Find a user by username.
    pub async fn find_by_username(&self, username: &str) -> DirectoryResult<Option<User>> {
        self.find_cached(&key_username(username), self.store.find_by_username(username))
            .await
    }

    /// Create a new user and return the public projection.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::DuplicateEmail` /
    /// `DirectoryError::DuplicateUsername` when a record with the same
    /// email (case-insensitive) or username exists. The store re-checks
    /// uniqueness atomically with the insert, so concurrent creates
    /// cannot both land even if both pass the pre-check.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> DirectoryResult<PublicUser> {
        if self.find_by_email(email).await?.is_some() {
            return Err(DirectoryError::DuplicateEmail);
        }
        if self.find_by_username(username).await?.is_some() {
            return Err(DirectoryError::DuplicateUsername);
        }

        let password_hash = hash_blocking(password.to_string()).await?;
        let user = User::new(username, email, password_hash, role);
        let created = self.store.insert(user).await?;

        // A newly created record must never be masked by a stale listing.
        self.cache.delete(&[KEY_ALL.to_string()]).await;

        tracing::info!(user_id = %created.id, username = %created.username, "user created");
        Ok(created.to_public())
    }

    /// Verify a plaintext password against a stored hash.
    pub async fn verify_password(&self, plain: &str, hash: &str) -> DirectoryResult<bool> {
        let plain = plain.to_string();
        let hash = hash.to_string();
        let matches = tokio::task::spawn_blocking(move || password::verify_password(&plain, &hash))
            .await
            .map_err(|e| DirectoryError::storage(format!("verify task failed: {e}")))??;
        Ok(matches)
    }

    /// List all users in creation order, without password hashes.
    pub async fn list(&self) -> DirectoryResult<Vec<PublicUser>> {
        if let Some(raw) = self.cache.get(KEY_ALL).await {
            match serde_json::from_str::<Vec<PublicUser>>(&raw) {
                Ok(users) => return Ok(users),
                Err(e) => {
                    tracing::warn!(key = KEY_ALL, error = %e, "discarding undecodable cache entry");
                    self.cache.delete(&[KEY_ALL.to_string()]).await;
                }
            }
        }

        let users: Vec<PublicUser> = self
            .store
            .list()
            .await?
            .iter()
            .map(User::to_public)
            .collect();

        match serde_json::to_string(&users) {
            Ok(raw) => self.cache.set(KEY_ALL, raw, self.cache_ttl).await,
            Err(e) => tracing::warn!(key = KEY_ALL, error = %e, "failed to serialize cache entry"),
        }
        Ok(users)
    }

    /// Invalidate every cache entry addressable by the given dimensions,
    /// plus the listing entry.
    pub async fn invalidate(&self, id: &str, email: Option<&str>, username: Option<&str>) {
        let mut keys = vec![key_id(id)];
        if let Some(email) = email {
            keys.push(key_email(email));
        }
        if let Some(username) = username {
            keys.push(key_username(username));
        }
        keys.push(KEY_ALL.to_string());
        self.cache.delete(&keys).await;
    }

    /// Create the well-known administrator account if no record with its
    /// email exists yet. Idempotent.
    pub async fn ensure_seed_admin(&self, seed: &SeedAdmin) -> DirectoryResult<()> {
        if self.find_by_email(&seed.email).await?.is_some() {
            return Ok(());
        }
        self.create(&seed.username, &seed.email, &seed.password, UserRole::Admin)
            .await?;
        tracing::info!(email = %seed.email, "seed admin created");
        Ok(())
    }

    /// Remove every record and the related cache entries. Test isolation
    /// only.
    pub async fn clear_all(&self) -> DirectoryResult<()> {
        let users = self.store.list().await?;
        self.store.clear().await?;
        for user in &users {
            self.invalidate(&user.id, Some(&user.email), Some(&user.username))
                .await;
        }
        self.cache.delete(&[KEY_ALL.to_string()]).await;
        Ok(())
    }
}

async fn hash_blocking(password: String) -> DirectoryResult<String> {
    let hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| DirectoryError::storage(format!("hash task failed: {e}")))??;
    Ok(hash)
}
