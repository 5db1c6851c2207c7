//! In-memory user store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use gatehouse_core::User;

use crate::DirectoryResult;
use crate::error::DirectoryError;
use crate::store::UserStore;

/// In-memory [`UserStore`] implementation.
///
/// Records live in insertion order inside a `Vec` guarded by an async
/// `RwLock`; the uniqueness check in [`insert`](UserStore::insert) runs
/// under the write lock, so concurrent creates with the same email or
/// username cannot both land.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: &str) -> DirectoryResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DirectoryResult<Option<User>> {
        let needle = email.to_lowercase();
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == needle).cloned())
    }

    async fn find_by_username(&self, username: &str) -> DirectoryResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert(&self, user: User) -> DirectoryResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(DirectoryError::DuplicateEmail);
        }
        if users.iter().any(|u| u.username == user.username) {
            return Err(DirectoryError::DuplicateUsername);
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn list(&self) -> DirectoryResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn clear(&self) -> DirectoryResult<()> {
        self.users.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::UserRole;

    fn user(name: &str, email: &str) -> User {
        User::new(name, email, "$argon2id$hash", UserRole::User)
    }

    #[tokio::test]
    async fn insert_and_find() {
        let store = MemoryUserStore::new();
        let created = store.insert(user("alice", "a@x.com")).await.unwrap();

        let by_id = store.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");

        let by_email = store.find_by_email("A@X.COM").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        let by_name = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);

        assert!(store.find_by_email("b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let store = MemoryUserStore::new();
        store.insert(user("alice", "a@x.com")).await.unwrap();

        let err = store.insert(user("bob", "A@x.com")).await.unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateEmail));
    }

    #[tokio::test]
    async fn duplicate_username_rejected() {
        let store = MemoryUserStore::new();
        store.insert(user("alice", "a@x.com")).await.unwrap();

        let err = store.insert(user("alice", "b@x.com")).await.unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateUsername));
    }

    #[tokio::test]
    async fn list_preserves_creation_order() {
        let store = MemoryUserStore::new();
        store.insert(user("alice", "a@x.com")).await.unwrap();
        store.insert(user("bob", "b@x.com")).await.unwrap();
        store.insert(user("carol", "c@x.com")).await.unwrap();

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn clear_empties_store() {
        let store = MemoryUserStore::new();
        store.insert(user("alice", "a@x.com")).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }
}
