//! The evaluation contract seen by the rest of the system

use crate::facts::Facts;
use crate::policy::PolicyName;
use crate::strategies::{build_strategy, PolicyStrategy};
use kith_core::{KithConfig, Result, StrategyKind, Verdict};
use std::sync::Arc;

/// Turns a strategy's answer into a [`Verdict`].
///
/// `Ok(true)` is allowed, `Ok(false)` is denied, and any error becomes an
/// internal failure. Cheap to clone and safe to share across threads.
#[derive(Debug, Clone)]
pub struct PolicyEvaluator {
    strategy: Arc<dyn PolicyStrategy>,
}

impl PolicyEvaluator {
    /// Wrap an already-built strategy.
    pub fn new(strategy: Arc<dyn PolicyStrategy>) -> Self {
        Self { strategy }
    }

    /// Build the strategy selected by `config`.
    pub fn from_config(config: &KithConfig) -> Result<Self> {
        Self::with_strategy(config.strategy, config)
    }

    /// Build a specific strategy, ignoring `config.strategy`.
    pub fn with_strategy(kind: StrategyKind, config: &KithConfig) -> Result<Self> {
        let strategy = build_strategy(kind, config)?;
        tracing::debug!(strategy = %kind, "policy evaluator ready");
        Ok(Self::new(strategy))
    }

    /// Strategy answering for this evaluator.
    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// Evaluate `policy` against `facts`.
    pub fn evaluate(&self, policy: PolicyName, facts: &Facts) -> Verdict {
        match self.strategy.evaluate(policy, facts) {
            Ok(allowed) => {
                tracing::debug!(
                    strategy = %self.strategy.kind(),
                    %policy,
                    allowed,
                    facts = %facts.to_json(),
                    "policy evaluated"
                );
                Verdict::from_allowed(allowed)
            }
            Err(e) => {
                tracing::error!(
                    strategy = %self.strategy.kind(),
                    %policy,
                    error = %e,
                    "policy evaluation failed"
                );
                Verdict::internal_failure(e.to_string())
            }
        }
    }
}
