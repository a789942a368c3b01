//! Boolean expressions from a declarative policy document
//!
//! Each policy is one expression over the request bindings that must
//! evaluate to a boolean:
//!
//! ```toml
//! [declarative]
//! "entry.read" = "actor == owner"
//! "friend.request" = "reachable(friends, actor, target)"
//! ```
//!
//! Supported: `==`, `!=`, `&&`, `||`, `!`, parentheses, string and boolean
//! literals, and the builtins `reachable(g, a, b)`, `declares(g, a, b)`,
//! `friends_of(g, a)` and `contains(list, x)`.

mod eval;
mod parser;

use super::{program_for, PolicyStrategy};
use crate::error::EvaluationError;
use crate::facts::Facts;
use crate::policy::PolicyName;
use crate::sources::PolicySources;
use kith_core::StrategyKind;
use parser::Expr;
use std::collections::BTreeMap;

/// Expression strategy; expressions are parsed once at construction.
#[derive(Debug, Clone)]
pub struct DeclarativeStrategy {
    expressions: BTreeMap<PolicyName, Expr>,
}

impl DeclarativeStrategy {
    /// Parse every policy expression.
    pub fn new(sources: &PolicySources) -> Result<Self, EvaluationError> {
        let mut expressions = BTreeMap::new();
        for policy in PolicyName::ALL {
            let source = program_for(sources, StrategyKind::Declarative, policy)?;
            let expr = parser::parse_expression(source)
                .map_err(|message| EvaluationError::parse(policy, message))?;
            expressions.insert(policy, expr);
        }
        Ok(Self { expressions })
    }
}

impl PolicyStrategy for DeclarativeStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Declarative
    }

    fn evaluate(&self, policy: PolicyName, facts: &Facts) -> Result<bool, EvaluationError> {
        facts.require(policy)?;
        let expr = self
            .expressions
            .get(&policy)
            .ok_or(EvaluationError::UnsupportedPolicy {
                strategy: StrategyKind::Declarative,
                policy,
            })?;
        eval::evaluate(expr, facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use kith_core::UserName;

    #[test]
    fn test_builtin_expressions() {
        let declarative = DeclarativeStrategy::new(&PolicySources::builtin().unwrap()).unwrap();
        assert!(declarative
            .evaluate(PolicyName::IdentityMatch, &Facts::identity_match("101", "101"))
            .unwrap());

        let dennis = UserName::from("Dennis");
        assert!(declarative
            .evaluate(PolicyName::EntryRead, &Facts::entry_read(&dennis, &dennis))
            .unwrap());
    }

    #[test]
    fn test_expression_over_undeclared_binding_fails_closed() {
        let mut sources = PolicySources::builtin().unwrap();
        sources.set(
            StrategyKind::Declarative,
            PolicyName::EntryRead,
            "actor == owner || role == 'admin'",
        );
        let declarative = DeclarativeStrategy::new(&sources).unwrap();

        let alice = UserName::from("Alice");
        let bob = UserName::from("Bob");
        assert_matches!(
            declarative.evaluate(PolicyName::EntryRead, &Facts::entry_read(&bob, &alice)),
            Err(EvaluationError::MissingBinding { .. })
        );
    }

    #[test]
    fn test_non_boolean_policy_fails_closed() {
        let mut sources = PolicySources::builtin().unwrap();
        sources.set(StrategyKind::Declarative, PolicyName::IdentityMatch, "presented");
        let declarative = DeclarativeStrategy::new(&sources).unwrap();

        assert_matches!(
            declarative.evaluate(PolicyName::IdentityMatch, &Facts::identity_match("1", "1")),
            Err(EvaluationError::Engine { .. })
        );
    }
}
