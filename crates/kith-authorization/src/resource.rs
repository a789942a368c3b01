//! Entry ownership

use crate::decision::enforce;
use kith_core::{
    AuthorizationRequest, Entry, EntryId, KithError, Result, User, UserName, Verdict,
};
use kith_policy::{Facts, PolicyEvaluator, PolicyName};
use kith_store::EntryStore;
use std::sync::Arc;

/// Decides whether a resolved user may read an entry.
#[derive(Clone)]
pub struct EntryAuthorizer {
    entries: Arc<dyn EntryStore>,
    evaluator: PolicyEvaluator,
}

impl EntryAuthorizer {
    /// Create an authorizer over `entries`.
    pub fn new(entries: Arc<dyn EntryStore>, evaluator: PolicyEvaluator) -> Self {
        Self { entries, evaluator }
    }

    /// Evaluate `entry.read`: only the owner may read.
    pub fn can_read(&self, actor: &User, entry: &Entry) -> Verdict {
        self.evaluate(&actor.name, entry)
    }

    /// Return the content of the entry `request.target` names if
    /// `request.actor` owns it.
    ///
    /// A missing entry is `NotFound` before any policy runs.
    pub fn authorize_read(&self, request: &AuthorizationRequest) -> Result<String> {
        let entry_id = EntryId::from(request.target.as_str());
        let entry = self.entries.entry(&entry_id)?;

        let verdict = self.evaluate(&request.actor, &entry);
        enforce(verdict, || {
            KithError::denied(format!("{} may not read entry {entry_id}", request.actor))
        })?;

        Ok(entry.content)
    }

    fn evaluate(&self, actor: &UserName, entry: &Entry) -> Verdict {
        self.evaluator
            .evaluate(PolicyName::EntryRead, &Facts::entry_read(actor, entry.owner()))
    }
}

impl std::fmt::Debug for EntryAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryAuthorizer")
            .field("strategy", &self.evaluator.strategy_kind())
            .finish_non_exhaustive()
    }
}
