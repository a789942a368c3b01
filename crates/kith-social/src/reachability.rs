//! Reachability over the friendship graph
//!
//! Breadth-first traversal guarded by a visited set: each node is expanded
//! at most once, so cyclic graphs terminate and the cost is O(V+E). The
//! traversal is iterative and never grows the call stack.

use crate::graph::FriendshipGraph;
use kith_core::UserName;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Outcome of a single traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traversal {
    /// Whether the target was reached
    pub reached: bool,
    /// Number of distinct nodes expanded before stopping
    pub visited: usize,
}

/// Run the traversal from `source` looking for `target`.
///
/// The frontier is seeded with the source's direct friends and the visited
/// set starts empty, so `source == target` is answered `true` exactly when
/// the source has at least one friend (it is reached again through any of
/// them). Stops as soon as the target is dequeued.
pub fn explore(source: &UserName, target: &UserName, graph: &FriendshipGraph) -> Traversal {
    let mut frontier: VecDeque<&UserName> = graph.neighbors(source).collect();
    let mut visited: BTreeSet<&UserName> = BTreeSet::new();

    while let Some(candidate) = frontier.pop_front() {
        if !visited.insert(candidate) {
            continue;
        }
        if candidate == target {
            return Traversal {
                reached: true,
                visited: visited.len(),
            };
        }
        frontier.extend(graph.neighbors(candidate).filter(|next| !visited.contains(*next)));
    }

    Traversal {
        reached: false,
        visited: visited.len(),
    }
}

/// Whether `source` and `target` are joined by a chain of friendships of
/// any length.
pub fn connected(source: &UserName, target: &UserName, graph: &FriendshipGraph) -> bool {
    let traversal = explore(source, target, graph);
    tracing::trace!(
        source = %source,
        target = %target,
        reached = traversal.reached,
        visited = traversal.visited,
        "reachability traversal finished"
    );
    traversal.reached
}

/// A shortest chain of friendships from `source` to `target`, both ends
/// included, or `None` when they are not connected.
///
/// Follows the same seeding rule as [`explore`], so a self-path is
/// `[source, friend, source]`.
pub fn path_between(
    source: &UserName,
    target: &UserName,
    graph: &FriendshipGraph,
) -> Option<Vec<UserName>> {
    let mut parents: BTreeMap<&UserName, &UserName> = BTreeMap::new();
    let mut visited: BTreeSet<&UserName> = BTreeSet::new();
    let mut frontier: VecDeque<(&UserName, &UserName)> =
        graph.neighbors(source).map(|friend| (friend, source)).collect();

    while let Some((candidate, parent)) = frontier.pop_front() {
        if !visited.insert(candidate) {
            continue;
        }
        parents.insert(candidate, parent);
        if candidate == target {
            return Some(unwind(source, candidate, &parents));
        }
        frontier.extend(
            graph
                .neighbors(candidate)
                .filter(|next| !visited.contains(*next))
                .map(|next| (next, candidate)),
        );
    }

    None
}

fn unwind(
    source: &UserName,
    reached: &UserName,
    parents: &BTreeMap<&UserName, &UserName>,
) -> Vec<UserName> {
    let mut path = vec![reached.clone()];
    let mut current = reached;
    // `source` gains a parent of its own when revisited; stop there.
    while let Some(parent) = parents.get(current).copied() {
        path.push(parent.clone());
        if parent == source {
            break;
        }
        current = parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> UserName {
        UserName::from(s)
    }

    /// Alice-Bob, Bob-Charlie, Charlie-Edward, Dennis alone.
    fn reference_graph() -> FriendshipGraph {
        let mut graph = FriendshipGraph::from_declarations([
            ("Alice", "Bob"),
            ("Bob", "Alice"),
            ("Bob", "Charlie"),
            ("Charlie", "Bob"),
            ("Charlie", "Edward"),
            ("Edward", "Charlie"),
        ]);
        graph.add_user(name("Dennis"));
        graph
    }

    #[test]
    fn test_two_hops() {
        assert!(connected(&name("Alice"), &name("Charlie"), &reference_graph()));
    }

    #[test]
    fn test_three_hops() {
        assert!(connected(&name("Alice"), &name("Edward"), &reference_graph()));
    }

    #[test]
    fn test_isolated_user_unreachable() {
        let graph = reference_graph();
        assert!(!connected(&name("Alice"), &name("Dennis"), &graph));
        assert!(!connected(&name("Dennis"), &name("Alice"), &graph));
    }

    #[test]
    fn test_unknown_users_unreachable() {
        let graph = reference_graph();
        assert!(!connected(&name("Alice"), &name("Mallory"), &graph));
        assert!(!connected(&name("Mallory"), &name("Alice"), &graph));
    }

    #[test]
    fn test_self_connection_follows_seeding_rule() {
        let graph = reference_graph();
        assert!(connected(&name("Alice"), &name("Alice"), &graph));
        assert!(!connected(&name("Dennis"), &name("Dennis"), &graph));
    }

    #[test]
    fn test_short_circuits_before_exhausting_graph() {
        let graph = reference_graph();
        let traversal = explore(&name("Alice"), &name("Bob"), &graph);
        assert!(traversal.reached);
        assert_eq!(traversal.visited, 1);
    }

    #[test]
    fn test_cycle_terminates_and_visits_each_node_once() {
        let graph =
            FriendshipGraph::from_declarations([("A", "B"), ("B", "C"), ("C", "A")]);

        let traversal = explore(&name("A"), &name("Z"), &graph);
        assert!(!traversal.reached);
        assert_eq!(traversal.visited, 3);
    }

    #[test]
    fn test_path_between() {
        let graph = reference_graph();
        let path = path_between(&name("Alice"), &name("Edward"), &graph).unwrap();
        assert_eq!(
            path,
            vec![name("Alice"), name("Bob"), name("Charlie"), name("Edward")]
        );
        assert!(path_between(&name("Alice"), &name("Dennis"), &graph).is_none());
    }

    #[test]
    fn test_self_path() {
        let graph = reference_graph();
        let path = path_between(&name("Alice"), &name("Alice"), &graph).unwrap();
        assert_eq!(path, vec![name("Alice"), name("Bob"), name("Alice")]);
    }
}
