//! Cross-strategy agreement over a whole store
//!
//! Every strategy is asked every question the store can pose: each ordered
//! pair of users for `identity.match` and `friend.request`, and each
//! entry/user pair for `entry.read`. Any difference in outcome is a
//! disagreement.

use anyhow::Result;
use kith_core::{FailureReason, KithConfig, StrategyKind};
use kith_policy::{Facts, PolicyEvaluator, PolicyName};
use kith_social::FriendshipGraph;
use kith_store::{EntryStore, IdentityStore, MemoryStore};
use serde::Serialize;
use std::collections::BTreeMap;

/// One question on which strategies answered differently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Disagreement {
    /// Policy asked
    pub policy: PolicyName,
    /// Human-readable subject of the question
    pub subject: String,
    /// `(allowed, failure)` per strategy
    pub outcomes: BTreeMap<StrategyKind, (bool, Option<FailureReason>)>,
}

/// Result of an agreement run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgreementReport {
    /// Number of questions asked of each strategy
    pub questions: usize,
    /// Questions with differing outcomes
    pub disagreements: Vec<Disagreement>,
}

impl AgreementReport {
    /// Whether every strategy agreed on every question.
    pub fn is_unanimous(&self) -> bool {
        self.disagreements.is_empty()
    }

    /// Plain-text summary, one line per disagreement.
    pub fn render(&self) -> String {
        let mut lines = vec![format!(
            "{} questions, {} disagreements",
            self.questions,
            self.disagreements.len()
        )];
        for d in &self.disagreements {
            let outcomes: Vec<String> = d
                .outcomes
                .iter()
                .map(|(kind, (allowed, failure))| match failure {
                    Some(reason) if !allowed => format!("{kind}={reason}"),
                    _ => format!("{kind}=allowed"),
                })
                .collect();
            lines.push(format!("{} {}: {}", d.policy, d.subject, outcomes.join(" ")));
        }
        lines.join("\n")
    }
}

/// Ask every strategy every question about `store`.
pub fn run(store: &MemoryStore, config: &KithConfig) -> Result<AgreementReport> {
    let evaluators = StrategyKind::ALL
        .into_iter()
        .map(|kind| PolicyEvaluator::with_strategy(kind, config))
        .collect::<kith_core::Result<Vec<_>>>()?;

    let users = store.users();
    let graph = FriendshipGraph::from_users(&users);
    let mut report = AgreementReport::default();

    let mut ask = |policy: PolicyName, subject: String, facts: Facts| {
        report.questions += 1;
        let outcomes: BTreeMap<_, _> = evaluators
            .iter()
            .map(|evaluator| {
                let verdict = evaluator.evaluate(policy, &facts);
                (evaluator.strategy_kind(), (verdict.allowed, verdict.failure))
            })
            .collect();

        let mut distinct = outcomes.values();
        let first = distinct.next().copied();
        if distinct.any(|outcome| Some(*outcome) != first) {
            tracing::warn!(%policy, %subject, "strategies disagree");
            report.disagreements.push(Disagreement {
                policy,
                subject,
                outcomes,
            });
        }
    };

    for presenter in &users {
        for holder in &users {
            ask(
                PolicyName::IdentityMatch,
                format!("{} presents {}'s token", presenter.name, holder.name),
                Facts::identity_match(presenter.token.expose(), holder.token.expose()),
            );
            ask(
                PolicyName::FriendRequest,
                format!("{} -> {}", presenter.name, holder.name),
                Facts::friend_request(&presenter.name, &holder.name, graph.clone()),
            );
        }
    }

    for id in store.entry_ids() {
        let entry = store.entry(&id)?;
        for reader in &users {
            ask(
                PolicyName::EntryRead,
                format!("{} reads entry {id}", reader.name),
                Facts::entry_read(&reader.name, entry.owner()),
            );
        }
    }

    tracing::info!(
        questions = report.questions,
        disagreements = report.disagreements.len(),
        "agreement run complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CliContext;

    #[test]
    fn test_reference_store_is_unanimous() {
        let ctx = CliContext::reference();
        let report = run(&ctx.store, &ctx.config).unwrap();

        // 5 users: 25 identity + 25 friend questions; 2 entries x 5 readers.
        assert_eq!(report.questions, 60);
        assert!(report.is_unanimous(), "{}", report.render());
        assert!(report.render().starts_with("60 questions, 0 disagreements"));
    }
}
