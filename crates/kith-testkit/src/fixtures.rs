//! The reference journaling data set
//!
//! Alice-Bob, Bob-Charlie and Charlie-Edward are friends (declared on both
//! sides); Dennis has no friends. Alice owns entry 1, Bob owns entry 2.

use kith_core::UserName;
use kith_social::FriendshipGraph;
use kith_store::{MemoryStore, Seed};
use std::sync::Arc;

/// `(name, token)` for every reference user.
pub const REFERENCE_USERS: [(&str, &str); 5] = [
    ("Alice", "123"),
    ("Bob", "456"),
    ("Charlie", "789"),
    ("Dennis", "101"),
    ("Edward", "112"),
];

/// Content of Alice's entry `1`.
pub const ALICE_ENTRY: &str = "Dear diary...";

/// Content of Bob's entry `2`.
pub const BOB_ENTRY: &str = "I have a secret to tell...";

/// The reference seed.
pub fn reference_seed() -> Seed {
    Seed::default()
        .with_user("Alice", "123", ["Bob"])
        .with_user("Bob", "456", ["Alice", "Charlie"])
        .with_user("Charlie", "789", ["Bob", "Edward"])
        .with_user("Dennis", "101", Vec::<String>::new())
        .with_user("Edward", "112", ["Charlie"])
        .with_entry("1", "Alice", ALICE_ENTRY)
        .with_entry("2", "Bob", BOB_ENTRY)
}

/// A fresh store holding the reference seed.
pub fn reference_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::from_seed(&reference_seed()).expect("reference seed is valid"))
}

/// The reference friendship graph, Dennis included as an isolated node.
pub fn reference_graph() -> FriendshipGraph {
    let store = MemoryStore::from_seed(&reference_seed()).expect("reference seed is valid");
    FriendshipGraph::from_users(&kith_store::IdentityStore::users(&store))
}

/// Token of a reference user.
pub fn token_of(name: &str) -> &'static str {
    REFERENCE_USERS
        .iter()
        .find(|(user, _)| *user == name)
        .map(|(_, token)| *token)
        .unwrap_or_else(|| panic!("{name} is not a reference user"))
}

/// `Bearer <token>` header for a reference user.
pub fn bearer(name: &str) -> String {
    format!("Bearer {}", token_of(name))
}

/// Shorthand for a user name.
pub fn user(name: &str) -> UserName {
    UserName::from(name)
}

/// A seed whose friendships form a single chain `n0 - n1 - ... - n{len}`.
pub fn chain_seed(len: usize) -> Seed {
    (0..=len).fold(Seed::default(), |seed, i| {
        let friends: Vec<String> = if i < len {
            vec![format!("n{}", i + 1)]
        } else {
            Vec::new()
        };
        seed.with_user(&format!("n{i}"), &format!("t{i}"), friends)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_graph_shape() {
        let graph = reference_graph();
        assert_eq!(graph.user_count(), 5);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.neighbors(&user("Dennis")).count(), 0);
    }

    #[test]
    fn test_chain_seed() {
        let seed = chain_seed(3);
        assert_eq!(seed.users.len(), 4);
        assert_eq!(seed.users["n0"].friends, vec!["n1".to_string()]);
        assert!(seed.users["n3"].friends.is_empty());
    }
}
