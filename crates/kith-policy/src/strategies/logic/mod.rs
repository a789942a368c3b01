//! Goal-proving evaluation over Horn clauses
//!
//! Each policy is a small program that must define `allow` with one argument
//! per policy binding, in order:
//!
//! ```text
//! connected(x, y) if friends(x, y) or friends(y, x);
//! connected(x, y) if friends(x, p) and connected(p, y);
//! connected(x, y) if friends(p, x) and connected(p, y);
//! allow(actor, target) if connected(actor, target);
//! ```
//!
//! For every request the bindings become ground facts: text bindings as
//! unary facts (`actor("Alice")`), graph bindings as one binary fact per
//! declared friendship. The strategy then asks whether
//! `allow("<arg1>", "<arg2>")` is provable, with a step budget of
//! `steps_per_fact` for every fact and clause involved.

mod parser;
mod prover;

use super::{program_for, PolicyStrategy};
use crate::error::EvaluationError;
use crate::facts::{Binding, Facts};
use crate::policy::PolicyName;
use crate::sources::PolicySources;
use kith_core::{LogicLimits, StrategyKind};
use prover::{prove, Atom, FactBase, Program};
use std::collections::BTreeMap;

const GOAL: &str = "allow";

/// Tabled backward-chaining strategy with programs parsed once at construction.
#[derive(Debug, Clone)]
pub struct LogicStrategy {
    programs: BTreeMap<PolicyName, Program>,
    limits: LogicLimits,
}

impl LogicStrategy {
    /// Parse every policy program.
    pub fn new(sources: &PolicySources, limits: LogicLimits) -> Result<Self, EvaluationError> {
        let mut programs = BTreeMap::new();
        for policy in PolicyName::ALL {
            let source = program_for(sources, StrategyKind::Logic, policy)?;
            let clauses = parser::parse_program(source)
                .map_err(|e| EvaluationError::parse(policy, e.to_string()))?;
            let program = Program::new(clauses);

            let arity = policy.arguments().len();
            if !program.defines(GOAL, arity) {
                return Err(EvaluationError::parse(
                    policy,
                    format!("program defines no `{GOAL}` rule with {arity} arguments"),
                ));
            }
            programs.insert(policy, program);
        }
        Ok(Self { programs, limits })
    }
}

impl PolicyStrategy for LogicStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Logic
    }

    fn evaluate(&self, policy: PolicyName, facts: &Facts) -> Result<bool, EvaluationError> {
        facts.require(policy)?;
        let program = self
            .programs
            .get(&policy)
            .ok_or(EvaluationError::UnsupportedPolicy {
                strategy: StrategyKind::Logic,
                policy,
            })?;

        let goal = Atom::ground(GOAL, &facts.arguments(policy)?);
        let base = fact_base(facts);
        let size = (base.fact_count() + program.clause_count() + 1) as u64;
        prove(program, &base, goal, self.limits.steps_per_fact.saturating_mul(size))
    }
}

fn fact_base(facts: &Facts) -> FactBase {
    let mut base = FactBase::default();
    for (name, binding) in facts.iter() {
        match binding {
            Binding::Text(value) => base.insert(name, &[value.as_str()]),
            Binding::Graph(graph) => {
                for (from, to) in graph.declarations() {
                    base.insert(name, &[from.as_str(), to.as_str()]);
                }
            }
        }
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use kith_core::UserName;
    use kith_social::FriendshipGraph;

    fn strategy() -> LogicStrategy {
        LogicStrategy::new(&PolicySources::builtin().unwrap(), LogicLimits::default()).unwrap()
    }

    #[test]
    fn test_builtin_programs() {
        let logic = strategy();
        assert!(logic
            .evaluate(PolicyName::IdentityMatch, &Facts::identity_match("789", "789"))
            .unwrap());

        let alice = UserName::from("Alice");
        let bob = UserName::from("Bob");
        assert!(!logic
            .evaluate(PolicyName::EntryRead, &Facts::entry_read(&alice, &bob))
            .unwrap());

        let graph = FriendshipGraph::from_declarations([
            ("Alice", "Bob"),
            ("Bob", "Alice"),
            ("Bob", "Charlie"),
            ("Charlie", "Bob"),
        ]);
        let facts = Facts::friend_request(&alice, &UserName::from("Charlie"), graph);
        assert!(logic.evaluate(PolicyName::FriendRequest, &facts).unwrap());
    }

    #[test]
    fn test_text_bindings_are_queryable_facts() {
        let mut sources = PolicySources::builtin().unwrap();
        sources.set(
            StrategyKind::Logic,
            PolicyName::EntryRead,
            r#"allow(_, _) if actor("root");"#,
        );
        let logic = LogicStrategy::new(&sources, LogicLimits::default()).unwrap();

        let root = UserName::from("root");
        let alice = UserName::from("Alice");
        assert!(logic
            .evaluate(PolicyName::EntryRead, &Facts::entry_read(&root, &alice))
            .unwrap());
        assert!(!logic
            .evaluate(PolicyName::EntryRead, &Facts::entry_read(&alice, &root))
            .unwrap());
    }

    #[test]
    fn test_program_without_goal_is_rejected() {
        let mut sources = PolicySources::builtin().unwrap();
        sources.set(StrategyKind::Logic, PolicyName::EntryRead, "allow(user);");
        assert_matches!(
            LogicStrategy::new(&sources, LogicLimits::default()),
            Err(EvaluationError::Parse {
                policy: PolicyName::EntryRead,
                ..
            })
        );
    }

    #[test]
    fn test_step_budget_fails_closed() {
        let logic = LogicStrategy::new(
            &PolicySources::builtin().unwrap(),
            LogicLimits { steps_per_fact: 1 },
        )
        .unwrap();
        let chain = FriendshipGraph::from_declarations(
            (0..10).map(|i| (format!("n{i}"), format!("n{}", i + 1))),
        );
        let facts = Facts::friend_request(&UserName::from("n0"), &UserName::from("n10"), chain);
        assert_matches!(
            logic.evaluate(PolicyName::FriendRequest, &facts),
            Err(EvaluationError::StepLimit { .. })
        );
    }
}
