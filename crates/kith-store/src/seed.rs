//! Startup provisioning data
//!
//! ```toml
//! [users.Alice]
//! token = "123"
//! friends = ["Bob"]
//!
//! [entries.1]
//! owner = "Alice"
//! content = "Dear diary..."
//! ```

use kith_core::{KithError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Users and entries provisioned at process start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seed {
    /// User records keyed by name
    pub users: BTreeMap<String, UserSeed>,
    /// Entries keyed by id
    pub entries: BTreeMap<String, EntrySeed>,
}

/// Seed form of a user record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSeed {
    /// Bearer token
    pub token: String,
    /// Declared friends
    pub friends: Vec<String>,
    /// Requests already pending at startup
    pub pending_friend_requests: Vec<String>,
}

/// Seed form of an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySeed {
    /// Owning user name
    pub owner: String,
    /// Entry text
    pub content: String,
}

impl Seed {
    /// Parse a TOML seed document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| KithError::invalid(format!("invalid seed TOML: {e}")))
    }

    /// Read and parse a TOML seed file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            KithError::invalid(format!("failed to read seed file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Add a user, replacing any previous record with the same name.
    pub fn with_user<I, S>(mut self, name: &str, token: &str, friends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users.insert(
            name.to_string(),
            UserSeed {
                token: token.to_string(),
                friends: friends.into_iter().map(Into::into).collect(),
                pending_friend_requests: Vec::new(),
            },
        );
        self
    }

    /// Add an entry.
    pub fn with_entry(mut self, id: &str, owner: &str, content: &str) -> Self {
        self.entries.insert(
            id.to_string(),
            EntrySeed {
                owner: owner.to_string(),
                content: content.to_string(),
            },
        );
        self
    }
}
