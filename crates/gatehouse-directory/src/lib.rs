//! Cache-aside user directory for the Gatehouse API gateway.
//!
//! The directory fronts a persistent [`store::UserStore`] with a TTL
//! key-value [`cache::CacheBackend`]. The cache is strictly an
//! optimization layer: its absence (or any cache error) never changes
//! the result of a lookup, only its latency.

pub mod cache;
pub mod directory;
pub mod error;
pub mod memory;
pub mod store;

pub use cache::{CacheBackend, CachedEntry};
pub use directory::{SeedAdmin, UserDirectory};
pub use error::DirectoryError;
pub use memory::MemoryUserStore;
pub use store::UserStore;

/// Result alias used throughout this crate.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
