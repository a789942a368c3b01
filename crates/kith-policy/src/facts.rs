//! Named bindings handed to a strategy for one evaluation

use crate::error::EvaluationError;
use crate::policy::PolicyName;
use kith_core::UserName;
use kith_social::FriendshipGraph;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Token presented by the caller.
pub const PRESENTED: &str = "presented";
/// Token stored on the candidate identity.
pub const STORED_TOKEN: &str = "stored_token";
/// Resolved identity making the request.
pub const ACTOR: &str = "actor";
/// Owner of the requested entry.
pub const OWNER: &str = "owner";
/// Friend-request target.
pub const TARGET: &str = "target";
/// Friendship graph snapshot.
pub const FRIENDS: &str = "friends";

/// A single binding value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Plain text: a name or a token
    Text(String),
    /// Friendship graph snapshot
    Graph(FriendshipGraph),
}

/// The bag of bindings for one request. Never retained by a strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facts {
    bindings: BTreeMap<String, Binding>,
}

impl Facts {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings for `identity.match`.
    pub fn identity_match(presented: &str, stored_token: &str) -> Self {
        Self::new()
            .with_text(PRESENTED, presented)
            .with_text(STORED_TOKEN, stored_token)
    }

    /// Bindings for `entry.read`.
    pub fn entry_read(actor: &UserName, owner: &UserName) -> Self {
        Self::new()
            .with_text(ACTOR, actor.as_str())
            .with_text(OWNER, owner.as_str())
    }

    /// Bindings for `friend.request`.
    pub fn friend_request(actor: &UserName, target: &UserName, friends: FriendshipGraph) -> Self {
        Self::new()
            .with_text(ACTOR, actor.as_str())
            .with_text(TARGET, target.as_str())
            .with_graph(FRIENDS, friends)
    }

    /// Add a text binding.
    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, Binding::Text(value.into()));
        self
    }

    /// Add a graph binding.
    pub fn with_graph(mut self, name: impl Into<String>, graph: FriendshipGraph) -> Self {
        self.insert(name, Binding::Graph(graph));
        self
    }

    /// Insert or replace a binding.
    pub fn insert(&mut self, name: impl Into<String>, binding: Binding) {
        self.bindings.insert(name.into(), binding);
    }

    /// Remove a binding, returning it.
    pub fn remove(&mut self, name: &str) -> Option<Binding> {
        self.bindings.remove(name)
    }

    /// Look up a binding of any shape.
    pub fn get(&self, name: &str) -> Result<&Binding, EvaluationError> {
        self.bindings
            .get(name)
            .ok_or_else(|| EvaluationError::missing(name))
    }

    /// Look up a text binding.
    pub fn text(&self, name: &str) -> Result<&str, EvaluationError> {
        match self.get(name)? {
            Binding::Text(value) => Ok(value.as_str()),
            Binding::Graph(_) => Err(EvaluationError::WrongBindingType {
                name: name.to_string(),
                expected: "text",
            }),
        }
    }

    /// Look up a graph binding.
    pub fn graph(&self, name: &str) -> Result<&FriendshipGraph, EvaluationError> {
        match self.get(name)? {
            Binding::Graph(graph) => Ok(graph),
            Binding::Text(_) => Err(EvaluationError::WrongBindingType {
                name: name.to_string(),
                expected: "a friendship graph",
            }),
        }
    }

    /// Check that every binding `policy` takes is present with the right
    /// shape.
    pub fn require(&self, policy: PolicyName) -> Result<(), EvaluationError> {
        for name in policy.arguments() {
            self.text(name)?;
        }
        if let Some(name) = policy.graph_binding() {
            self.graph(name)?;
        }
        Ok(())
    }

    /// The policy's text arguments, in order.
    pub fn arguments(&self, policy: PolicyName) -> Result<Vec<&str>, EvaluationError> {
        policy.arguments().iter().map(|name| self.text(name)).collect()
    }

    /// Every binding, in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> + '_ {
        self.bindings.iter().map(|(name, binding)| (name.as_str(), binding))
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// JSON rendering for decision logs. Token bindings are redacted and
    /// graphs are rendered as `declarer -> [friends]`.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (name, binding) in &self.bindings {
            let value = match binding {
                Binding::Text(_) if name == PRESENTED || name == STORED_TOKEN => {
                    json!("<redacted>")
                }
                Binding::Text(text) => json!(text),
                Binding::Graph(graph) => {
                    let mut declared: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
                    for (from, to) in graph.declarations() {
                        declared.entry(from.as_str()).or_default().push(to.as_str());
                    }
                    json!(declared)
                }
            };
            object.insert(name.clone(), value);
        }
        Value::Object(object)
    }
}
