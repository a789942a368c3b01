//! Kith Social - friendship graph and reachability
//!
//! The friend-request decision asks whether two users are joined by a chain
//! of friendships of any length. This crate owns that question:
//!
//! - `FriendshipGraph`: declared friendships plus their undirected union
//! - `connected` / `explore`: visited-set-guarded breadth-first traversal
//! - `path_between`: the chain that explains a connection
//!
//! # Example
//!
//! ```
//! use kith_core::UserName;
//! use kith_social::{connected, FriendshipGraph};
//!
//! let graph = FriendshipGraph::from_declarations([("Alice", "Bob"), ("Charlie", "Bob")]);
//! assert!(connected(&UserName::from("Alice"), &UserName::from("Charlie"), &graph));
//! ```

pub mod graph;
pub mod reachability;

pub use graph::FriendshipGraph;
pub use reachability::{connected, explore, path_between, Traversal};
