//! Domain records and decision types

use crate::errors::FailureReason;
use crate::identifiers::{Token, UserName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique key, stable for the process lifetime
    pub name: UserName,
    /// Bearer token the user presents to identify themselves
    pub token: Token,
    /// Names this user declares a direct friendship with
    #[serde(default)]
    pub friends: BTreeSet<UserName>,
    /// Requester names awaiting acceptance, oldest first
    #[serde(default)]
    pub pending_friend_requests: Vec<UserName>,
}

impl User {
    /// Create a user with no friends and no pending requests.
    pub fn new(name: impl Into<UserName>, token: impl Into<Token>) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
            friends: BTreeSet::new(),
            pending_friend_requests: Vec::new(),
        }
    }

    /// Builder-style friend declaration.
    pub fn with_friend(mut self, friend: impl Into<UserName>) -> Self {
        self.friends.insert(friend.into());
        self
    }

    /// Whether this user declares `other` as a friend.
    pub fn declares_friend(&self, other: &UserName) -> bool {
        self.friends.contains(other)
    }
}

/// A journal record with exactly one immutable owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    owner: UserName,
    /// Opaque text payload
    pub content: String,
}

impl Entry {
    /// Create an entry owned by `owner`.
    pub fn new(owner: impl Into<UserName>, content: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            content: content.into(),
        }
    }

    /// The user whose content this is.
    pub fn owner(&self) -> &UserName {
        &self.owner
    }
}

/// The question posed to a decision component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    /// Resolved identity making the request
    pub actor: UserName,
    /// Resource identifier or candidate peer, decision-specific
    pub target: String,
}

impl AuthorizationRequest {
    /// Create a request.
    pub fn new(actor: UserName, target: impl Into<String>) -> Self {
        Self {
            actor,
            target: target.into(),
        }
    }
}

/// The answer to a policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the request is permitted
    pub allowed: bool,
    /// Why it was not permitted; `None` exactly when `allowed`
    pub failure: Option<FailureReason>,
    /// Engine message accompanying an internal failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Verdict {
    /// An allowing verdict.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            failure: None,
            detail: None,
        }
    }

    /// The policy evaluated to false.
    pub fn deny() -> Self {
        Self {
            allowed: false,
            failure: Some(FailureReason::Denied),
            detail: None,
        }
    }

    /// The strategy could not decide.
    pub fn internal_failure(detail: impl Into<String>) -> Self {
        Self {
            allowed: false,
            failure: Some(FailureReason::InternalFailure),
            detail: Some(detail.into()),
        }
    }

    /// Build from a boolean policy result.
    pub fn from_allowed(allowed: bool) -> Self {
        if allowed {
            Self::allow()
        } else {
            Self::deny()
        }
    }

    /// Whether the strategy failed to reach a decision.
    pub fn is_internal_failure(&self) -> bool {
        self.failure == Some(FailureReason::InternalFailure)
    }
}
