//! The closed set of policies the decision core asks about

use crate::facts::{ACTOR, FRIENDS, OWNER, PRESENTED, STORED_TOKEN, TARGET};
use kith_core::{KithError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A policy question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PolicyName {
    /// Does the presented token match the candidate's stored token?
    #[serde(rename = "identity.match")]
    IdentityMatch,
    /// May the actor read an entry with this owner?
    #[serde(rename = "entry.read")]
    EntryRead,
    /// Is the actor connected to the friend-request target?
    #[serde(rename = "friend.request")]
    FriendRequest,
}

impl PolicyName {
    /// Every policy, in a stable order.
    pub const ALL: [PolicyName; 3] = [
        PolicyName::IdentityMatch,
        PolicyName::EntryRead,
        PolicyName::FriendRequest,
    ];

    /// Dotted name used in policy files and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IdentityMatch => "identity.match",
            Self::EntryRead => "entry.read",
            Self::FriendRequest => "friend.request",
        }
    }

    /// Text bindings the policy takes, in argument order.
    ///
    /// Goal-proving strategies pass them positionally to `allow`.
    pub fn arguments(self) -> &'static [&'static str] {
        match self {
            Self::IdentityMatch => &[PRESENTED, STORED_TOKEN],
            Self::EntryRead => &[ACTOR, OWNER],
            Self::FriendRequest => &[ACTOR, TARGET],
        }
    }

    /// Friendship-graph binding the policy takes, if any.
    pub fn graph_binding(self) -> Option<&'static str> {
        match self {
            Self::FriendRequest => Some(FRIENDS),
            Self::IdentityMatch | Self::EntryRead => None,
        }
    }
}

impl fmt::Display for PolicyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyName {
    type Err = KithError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|policy| policy.as_str() == s.trim())
            .ok_or_else(|| KithError::invalid(format!("unknown policy '{s}'")))
    }
}
