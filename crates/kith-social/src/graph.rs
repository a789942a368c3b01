//! Friendship graph
//!
//! Keeps the friendships exactly as users declared them, plus an undirected
//! adjacency view in which A and B are neighbors if either side declared the
//! other. Rule-based evaluators consume the declarations; the traversal walks
//! the adjacency.

use kith_core::{User, UserName};
use std::collections::{BTreeMap, BTreeSet};

/// Snapshot of declared friendships and their undirected union.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendshipGraph {
    /// Declared edges, from declarer to declared friend
    declared: BTreeMap<UserName, BTreeSet<UserName>>,
    /// Unioned, symmetric adjacency
    adjacency: BTreeMap<UserName, BTreeSet<UserName>>,
}

impl FriendshipGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from user records. Every user becomes a node, even
    /// without friends.
    pub fn from_users<'a, I>(users: I) -> Self
    where
        I: IntoIterator<Item = &'a User>,
    {
        let mut graph = Self::new();
        for user in users {
            graph.add_user(user.name.clone());
            for friend in &user.friends {
                graph.declare(user.name.clone(), friend.clone());
            }
        }
        graph
    }

    /// Build a graph from `(declarer, friend)` pairs.
    pub fn from_declarations<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<UserName>,
        B: Into<UserName>,
    {
        let mut graph = Self::new();
        for (from, to) in pairs {
            graph.declare(from, to);
        }
        graph
    }

    /// Ensure `name` is a node.
    pub fn add_user(&mut self, name: UserName) {
        self.adjacency.entry(name).or_default();
    }

    /// Record that `from` declares `to` as a friend.
    pub fn declare(&mut self, from: impl Into<UserName>, to: impl Into<UserName>) {
        let from = from.into();
        let to = to.into();

        self.declared
            .entry(from.clone())
            .or_default()
            .insert(to.clone());
        self.adjacency
            .entry(from.clone())
            .or_default()
            .insert(to.clone());
        self.adjacency.entry(to).or_default().insert(from);
    }

    /// Whether `name` is a node of the graph.
    pub fn contains(&self, name: &UserName) -> bool {
        self.adjacency.contains_key(name)
    }

    /// Undirected neighbors of `name`; empty for unknown users.
    pub fn neighbors<'a>(&'a self, name: &UserName) -> impl Iterator<Item = &'a UserName> + 'a {
        self.adjacency.get(name).into_iter().flatten()
    }

    /// Whether `from` itself declared `to` (direction matters).
    pub fn declares(&self, from: &UserName, to: &UserName) -> bool {
        self.declared
            .get(from)
            .is_some_and(|friends| friends.contains(to))
    }

    /// Every declared `(from, to)` pair, in order.
    pub fn declarations(&self) -> impl Iterator<Item = (&UserName, &UserName)> + '_ {
        self.declared
            .iter()
            .flat_map(|(from, friends)| friends.iter().map(move |to| (from, to)))
    }

    /// Every node, in order.
    pub fn users(&self) -> impl Iterator<Item = &UserName> + '_ {
        self.adjacency.keys()
    }

    /// Neighbors shared by `a` and `b`.
    pub fn mutual_friends(&self, a: &UserName, b: &UserName) -> BTreeSet<UserName> {
        match (self.adjacency.get(a), self.adjacency.get(b)) {
            (Some(left), Some(right)) => left.intersection(right).cloned().collect(),
            _ => BTreeSet::new(),
        }
    }

    /// Number of nodes.
    pub fn user_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        let endpoints: usize = self.adjacency.values().map(BTreeSet::len).sum();
        let self_loops = self
            .adjacency
            .iter()
            .filter(|(name, friends)| friends.contains(*name))
            .count();
        (endpoints + self_loops) / 2
    }
}
