//! Plain Rust evaluation

use super::PolicyStrategy;
use crate::error::EvaluationError;
use crate::facts::{Facts, ACTOR, FRIENDS, OWNER, PRESENTED, STORED_TOKEN, TARGET};
use crate::policy::PolicyName;
use kith_core::{StrategyKind, UserName};
use kith_social::connected;

/// Token equality, owner equality and breadth-first reachability.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeStrategy;

impl PolicyStrategy for NativeStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Native
    }

    fn evaluate(&self, policy: PolicyName, facts: &Facts) -> Result<bool, EvaluationError> {
        facts.require(policy)?;
        match policy {
            PolicyName::IdentityMatch => Ok(facts.text(PRESENTED)? == facts.text(STORED_TOKEN)?),
            PolicyName::EntryRead => Ok(facts.text(ACTOR)? == facts.text(OWNER)?),
            PolicyName::FriendRequest => {
                let actor = UserName::from(facts.text(ACTOR)?);
                let target = UserName::from(facts.text(TARGET)?);
                Ok(connected(&actor, &target, facts.graph(FRIENDS)?))
            }
        }
    }
}
