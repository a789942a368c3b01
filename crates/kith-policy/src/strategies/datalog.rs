//! Forward-chaining evaluation on Biscuit's Datalog engine
//!
//! Text bindings become unary facts (`actor("Alice")`); a graph binding
//! becomes one binary fact per declared friendship (`friends("Alice", "Bob")`).
//! A program is allowed when one of its `allow if` policies matches first.
//! Denials come back from the engine as failed logic; everything else the
//! engine reports (parse errors, exhausted run limits) is an internal error.
//!
//! The engine derives at most one new hop of reachability per round, so the
//! configured fact and round limits act as floors that each evaluation raises
//! in proportion to the facts it loads.

use super::{program_for, PolicyStrategy};
use crate::error::EvaluationError;
use crate::facts::{Binding, Facts};
use crate::policy::PolicyName;
use biscuit_auth::builder::{fact, string, Fact};
use biscuit_auth::{error, Authorizer, AuthorizerLimits};
use kith_core::{DatalogLimits, StrategyKind};
use std::collections::BTreeMap;
use std::time::Duration;

/// Derived facts allowed per loaded fact, on top of the configured floor.
const FACTS_PER_LOADED_FACT: u64 = 16;

/// Rounds beyond two per loaded fact.
const ROUND_SLACK: u64 = 8;

/// Datalog-backed strategy.
#[derive(Debug, Clone)]
pub struct DatalogStrategy {
    programs: BTreeMap<PolicyName, String>,
    limits: DatalogLimits,
}

impl DatalogStrategy {
    /// Validate every policy program against the engine's parser.
    pub fn new(
        sources: &crate::sources::PolicySources,
        limits: DatalogLimits,
    ) -> Result<Self, EvaluationError> {
        let mut programs = BTreeMap::new();
        for policy in PolicyName::ALL {
            let program = program_for(sources, StrategyKind::Datalog, policy)?;
            Authorizer::new()
                .add_code(program)
                .map_err(|e| EvaluationError::parse(policy, e.to_string()))?;
            programs.insert(policy, program.to_string());
        }
        Ok(Self { programs, limits })
    }

    fn engine_limits(&self, loaded: usize) -> AuthorizerLimits {
        let loaded = loaded as u64;
        AuthorizerLimits {
            max_facts: self
                .limits
                .max_facts
                .max(FACTS_PER_LOADED_FACT.saturating_mul(loaded + 1)),
            max_iterations: self
                .limits
                .max_iterations
                .max(loaded.saturating_mul(2).saturating_add(ROUND_SLACK)),
            max_time: Duration::from_millis(self.limits.max_time_ms),
        }
    }

    fn authorizer(&self, program: &str, facts: &Facts) -> Result<Authorizer, EvaluationError> {
        let datalog = to_datalog(facts);
        let mut authorizer = Authorizer::new();
        authorizer.set_limits(self.engine_limits(datalog.len()));
        for datalog_fact in datalog {
            authorizer
                .add_fact(datalog_fact)
                .map_err(|e| EvaluationError::engine(e.to_string()))?;
        }
        authorizer
            .add_code(program)
            .map_err(|e| EvaluationError::engine(e.to_string()))?;
        Ok(authorizer)
    }
}

impl PolicyStrategy for DatalogStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Datalog
    }

    fn evaluate(&self, policy: PolicyName, facts: &Facts) -> Result<bool, EvaluationError> {
        facts.require(policy)?;
        let program = self
            .programs
            .get(&policy)
            .ok_or(EvaluationError::UnsupportedPolicy {
                strategy: StrategyKind::Datalog,
                policy,
            })?;

        let mut authorizer = self.authorizer(program, facts)?;
        match authorizer.authorize() {
            Ok(_) => Ok(true),
            Err(error::Token::FailedLogic(logic)) => {
                tracing::trace!(%policy, ?logic, "datalog policy did not allow");
                Ok(false)
            }
            Err(e) => Err(EvaluationError::engine(e.to_string())),
        }
    }
}

fn to_datalog(facts: &Facts) -> Vec<Fact> {
    let mut datalog = Vec::new();
    for (name, binding) in facts.iter() {
        match binding {
            Binding::Text(value) => datalog.push(fact(name, &[string(value)])),
            Binding::Graph(graph) => datalog.extend(
                graph
                    .declarations()
                    .map(|(from, to)| fact(name, &[string(from.as_str()), string(to.as_str())])),
            ),
        }
    }
    datalog
}
