//! In-memory store backed by ordered maps

use crate::seed::Seed;
use crate::{EntryStore, IdentityStore};
use kith_core::{Entry, EntryId, KithError, Result, Token, User, UserName};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

/// Process-local user and entry tables.
///
/// Users iterate in name order, which makes token lookups deterministic for
/// a fixed store state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<BTreeMap<UserName, User>>,
    entries: RwLock<BTreeMap<EntryId, Entry>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from seed data, validating it first.
    ///
    /// Empty names or tokens and entries owned by unknown users are rejected.
    /// Dangling friend references and shared tokens are accepted with a
    /// warning, since the decision core tolerates both.
    pub fn from_seed(seed: &Seed) -> Result<Self> {
        let store = Self::new();
        let mut seen_tokens: BTreeMap<&str, &str> = BTreeMap::new();

        for (name, user) in &seed.users {
            if name.trim().is_empty() {
                return Err(KithError::invalid("seed contains a user with an empty name"));
            }
            if user.token.trim().is_empty() {
                return Err(KithError::invalid(format!("user {name} has an empty token")));
            }
            if let Some(previous) = seen_tokens.insert(user.token.as_str(), name.as_str()) {
                tracing::warn!(
                    first = %previous,
                    second = %name,
                    "two users share a token; lookups resolve to the first by name"
                );
            }
            for friend in &user.friends {
                if !seed.users.contains_key(friend) {
                    tracing::warn!(user = %name, friend = %friend, "friend reference to unknown user");
                }
            }

            store.insert_user(User {
                name: UserName::new(name.as_str()),
                token: Token::new(user.token.as_str()),
                friends: user
                    .friends
                    .iter()
                    .map(|f| UserName::new(f.as_str()))
                    .collect::<BTreeSet<_>>(),
                pending_friend_requests: user
                    .pending_friend_requests
                    .iter()
                    .map(|r| UserName::new(r.as_str()))
                    .collect(),
            });
        }

        for (id, entry) in &seed.entries {
            if !seed.users.contains_key(&entry.owner) {
                return Err(KithError::invalid(format!(
                    "entry {id} is owned by unknown user {}",
                    entry.owner
                )));
            }
            store.insert_entry(
                EntryId::new(id.as_str()),
                Entry::new(entry.owner.as_str(), entry.content.as_str()),
            );
        }

        tracing::debug!(
            users = seed.users.len(),
            entries = seed.entries.len(),
            "store provisioned from seed"
        );
        Ok(store)
    }

    /// Insert or replace a user record.
    pub fn insert_user(&self, user: User) {
        self.users.write().insert(user.name.clone(), user);
    }

    /// Insert or replace an entry.
    pub fn insert_entry(&self, id: EntryId, entry: Entry) {
        self.entries.write().insert(id, entry);
    }

    /// Ids of every entry, in order.
    pub fn entry_ids(&self) -> Vec<EntryId> {
        self.entries.read().keys().cloned().collect()
    }

    /// Number of user records.
    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }
}

impl IdentityStore for MemoryStore {
    fn lookup_by_token(&self, token: &str) -> Result<User> {
        self.users
            .read()
            .values()
            .find(|user| user.token.expose() == token)
            .cloned()
            .ok_or_else(|| KithError::not_found("no user holds the presented token"))
    }

    fn lookup_by_name(&self, name: &UserName) -> Result<User> {
        self.users
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| KithError::not_found(format!("user {name}")))
    }

    fn users(&self) -> Vec<User> {
        self.users.read().values().cloned().collect()
    }

    fn append_friend_request(
        &self,
        target: &UserName,
        requester: &UserName,
        deduplicate: bool,
    ) -> Result<bool> {
        let mut users = self.users.write();
        let user = users
            .get_mut(target)
            .ok_or_else(|| KithError::not_found(format!("user {target}")))?;

        if deduplicate && user.pending_friend_requests.contains(requester) {
            return Ok(false);
        }
        user.pending_friend_requests.push(requester.clone());
        Ok(true)
    }
}

impl EntryStore for MemoryStore {
    fn entry(&self, id: &EntryId) -> Result<Entry> {
        self.entries
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| KithError::not_found(format!("entry {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::Arc;

    fn reference_seed() -> Seed {
        Seed::default()
            .with_user("Alice", "123", ["Bob"])
            .with_user("Bob", "456", ["Alice"])
            .with_entry("1", "Alice", "Dear diary...")
    }

    #[test]
    fn test_lookup_by_token() {
        let store = MemoryStore::from_seed(&reference_seed()).unwrap();
        assert_eq!(store.lookup_by_token("456").unwrap().name.as_str(), "Bob");
        assert_matches!(store.lookup_by_token("999"), Err(KithError::NotFound { .. }));
    }

    #[test]
    fn test_lookup_by_name() {
        let store = MemoryStore::from_seed(&reference_seed()).unwrap();
        let alice = store.lookup_by_name(&UserName::from("Alice")).unwrap();
        assert!(alice.declares_friend(&UserName::from("Bob")));
        assert_matches!(
            store.lookup_by_name(&UserName::from("Mallory")),
            Err(KithError::NotFound { .. })
        );
    }

    #[test]
    fn test_entry_lookup() {
        let store = MemoryStore::from_seed(&reference_seed()).unwrap();
        let entry = store.entry(&EntryId::from("1")).unwrap();
        assert_eq!(entry.owner().as_str(), "Alice");
        assert_matches!(store.entry(&EntryId::from("3")), Err(KithError::NotFound { .. }));
    }

    #[test]
    fn test_duplicate_tokens_resolve_first_by_name() {
        let seed = Seed::default()
            .with_user("Zed", "same", Vec::<String>::new())
            .with_user("Amy", "same", Vec::<String>::new());
        let store = MemoryStore::from_seed(&seed).unwrap();

        for _ in 0..10 {
            assert_eq!(store.lookup_by_token("same").unwrap().name.as_str(), "Amy");
        }
    }

    #[test]
    fn test_seed_validation() {
        let empty_token = Seed::default().with_user("Alice", "  ", Vec::<String>::new());
        assert_matches!(
            MemoryStore::from_seed(&empty_token),
            Err(KithError::Invalid { .. })
        );

        let orphan_entry = Seed::default().with_entry("1", "Ghost", "boo");
        assert_matches!(
            MemoryStore::from_seed(&orphan_entry),
            Err(KithError::Invalid { .. })
        );

        let dangling_friend = Seed::default().with_user("Alice", "123", ["Nobody"]);
        assert!(MemoryStore::from_seed(&dangling_friend).is_ok());
    }

    #[test]
    fn test_append_friend_request_duplicates_by_default() {
        let store = MemoryStore::from_seed(&reference_seed()).unwrap();
        let alice = UserName::from("Alice");
        let bob = UserName::from("Bob");

        assert!(store.append_friend_request(&alice, &bob, false).unwrap());
        assert!(store.append_friend_request(&alice, &bob, false).unwrap());
        assert_eq!(
            store.lookup_by_name(&alice).unwrap().pending_friend_requests,
            vec![bob.clone(), bob]
        );
    }

    #[test]
    fn test_append_friend_request_deduplicated() {
        let store = MemoryStore::from_seed(&reference_seed()).unwrap();
        let alice = UserName::from("Alice");
        let bob = UserName::from("Bob");

        assert!(store.append_friend_request(&alice, &bob, true).unwrap());
        assert!(!store.append_friend_request(&alice, &bob, true).unwrap());
        assert_eq!(
            store.lookup_by_name(&alice).unwrap().pending_friend_requests,
            vec![bob]
        );
    }

    #[test]
    fn test_append_to_unknown_target() {
        let store = MemoryStore::new();
        assert_matches!(
            store.append_friend_request(&UserName::from("Nobody"), &UserName::from("Alice"), false),
            Err(KithError::NotFound { .. })
        );
    }

    #[test]
    fn test_concurrent_appends_are_all_recorded() {
        let store = Arc::new(MemoryStore::from_seed(&reference_seed()).unwrap());
        let alice = UserName::from("Alice");

        std::thread::scope(|scope| {
            for i in 0..8 {
                let store = Arc::clone(&store);
                let alice = alice.clone();
                scope.spawn(move || {
                    for j in 0..25 {
                        let requester = UserName::new(format!("user-{i}-{j}"));
                        store.append_friend_request(&alice, &requester, false).unwrap();
                        let _ = store.lookup_by_token("123");
                    }
                });
            }
        });

        assert_eq!(
            store.lookup_by_name(&alice).unwrap().pending_friend_requests.len(),
            200
        );
    }
}
