//! Kith Store - identity and entry lookup
//!
//! Stores are pure data: lookups by key, one append-only mutation, nothing
//! else. The traits are the seam the decision core depends on; `MemoryStore`
//! is the in-process implementation seeded at startup.
//!
//! # Locking
//!
//! `MemoryStore` guards each table with a `parking_lot::RwLock`. Lookups take
//! the read lock. `append_friend_request` takes the user-table write lock, so
//! it is serialized against every reader and writer of the same record.

pub mod memory;
pub mod seed;

pub use memory::MemoryStore;
pub use seed::{EntrySeed, Seed, UserSeed};

use kith_core::{Entry, EntryId, Result, User, UserName};

/// Read-mostly access to user records.
pub trait IdentityStore: Send + Sync {
    /// Find the user holding `token`.
    ///
    /// Returns `KithError::NotFound` when no user matches. When several users
    /// share a token the first in iteration order wins; callers must not rely
    /// on which one that is.
    fn lookup_by_token(&self, token: &str) -> Result<User>;

    /// Find a user by name, or `KithError::NotFound`.
    fn lookup_by_name(&self, name: &UserName) -> Result<User>;

    /// Snapshot of every user record.
    fn users(&self) -> Vec<User>;

    /// Append `requester` to `target`'s pending friend requests.
    ///
    /// Returns whether an entry was appended; with `deduplicate` set, an
    /// already pending requester is not appended again.
    fn append_friend_request(
        &self,
        target: &UserName,
        requester: &UserName,
        deduplicate: bool,
    ) -> Result<bool>;
}

/// Read access to journal entries.
pub trait EntryStore: Send + Sync {
    /// Find an entry by id, or `KithError::NotFound`.
    fn entry(&self, id: &EntryId) -> Result<Entry>;
}
