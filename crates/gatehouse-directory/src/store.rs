//! Storage trait for the persistent user store.

use async_trait::async_trait;

use gatehouse_core::User;

use crate::DirectoryResult;

/// Storage operations for user records.
///
/// The store is the source of truth; the directory layers caching on top.
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Example
///
/// ```ignore
/// use gatehouse_directory::UserStore;
///
/// async fn example(store: &dyn UserStore) {
///     if let Some(user) = store.find_by_email("alice@example.com").await? {
///         println!("found {}", user.username);
///     }
/// }
/// ```
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by their store-assigned id.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure failures, not for missing
    /// records.
    async fn find_by_id(&self, id: &str) -> DirectoryResult<Option<User>>;

    /// Find a user by email (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_email(&self, email: &str) -> DirectoryResult<Option<User>>;

    /// Find a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_username(&self, username: &str) -> DirectoryResult<Option<User>>;

    /// Insert a new user record.
    ///
    /// Uniqueness of email (case-insensitive) and username is enforced
    /// here, atomically with the insert; callers may pre-check for a
    /// better error path but must not rely on the pre-check alone.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::DuplicateEmail` or
    /// `DirectoryError::DuplicateUsername` on a uniqueness violation.
    async fn insert(&self, user: User) -> DirectoryResult<User>;

    /// List all users in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn list(&self) -> DirectoryResult<Vec<User>>;

    /// Remove every record. Test isolation only.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn clear(&self) -> DirectoryResult<()>;
}
