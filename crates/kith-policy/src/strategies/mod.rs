//! Interchangeable evaluation strategies
//!
//! Each strategy answers the same three policy questions from the same
//! facts. Programs are compiled once at construction; nothing from a request
//! outlives the call that received it.

pub mod datalog;
pub mod declarative;
pub mod logic;
pub mod native;

use crate::error::EvaluationError;
use crate::facts::Facts;
use crate::policy::PolicyName;
use crate::sources::PolicySources;
use kith_core::{KithConfig, KithError, Result, StrategyKind};
use std::fmt;
use std::sync::Arc;

pub use datalog::DatalogStrategy;
pub use declarative::DeclarativeStrategy;
pub use logic::LogicStrategy;
pub use native::NativeStrategy;

/// One way of evaluating policies.
pub trait PolicyStrategy: Send + Sync + fmt::Debug {
    /// Which strategy this is.
    fn kind(&self) -> StrategyKind;

    /// Evaluate `policy` against `facts`.
    ///
    /// `Ok(true)` allows, `Ok(false)` denies. Errors must never be folded
    /// into either.
    fn evaluate(
        &self,
        policy: PolicyName,
        facts: &Facts,
    ) -> std::result::Result<bool, EvaluationError>;
}

/// Build the strategy `kind` with built-in programs overlaid by the
/// configured policy file.
pub fn build_strategy(kind: StrategyKind, config: &KithConfig) -> Result<Arc<dyn PolicyStrategy>> {
    let sources = PolicySources::for_config(config)?;
    build_strategy_with(kind, &sources, config)
}

/// Build the strategy `kind` from explicit sources.
///
/// Programs that fail to compile are reported as invalid configuration.
pub fn build_strategy_with(
    kind: StrategyKind,
    sources: &PolicySources,
    config: &KithConfig,
) -> Result<Arc<dyn PolicyStrategy>> {
    let compiled: std::result::Result<Arc<dyn PolicyStrategy>, EvaluationError> = match kind {
        StrategyKind::Native => Ok(Arc::new(NativeStrategy)),
        StrategyKind::Datalog => {
            DatalogStrategy::new(sources, config.datalog.clone()).map(|s| Arc::new(s) as _)
        }
        StrategyKind::Logic => {
            LogicStrategy::new(sources, config.logic.clone()).map(|s| Arc::new(s) as _)
        }
        StrategyKind::Declarative => DeclarativeStrategy::new(sources).map(|s| Arc::new(s) as _),
    };

    compiled.map_err(|e| KithError::invalid(format!("{kind} strategy: {e}")))
}

/// The program for `policy`, or `UnsupportedPolicy`.
pub(crate) fn program_for(
    sources: &PolicySources,
    kind: StrategyKind,
    policy: PolicyName,
) -> std::result::Result<&str, EvaluationError> {
    sources
        .program(kind, policy)
        .ok_or(EvaluationError::UnsupportedPolicy {
            strategy: kind,
            policy,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_builds_every_strategy_from_defaults() {
        let config = KithConfig::default();
        for kind in StrategyKind::ALL {
            let strategy = build_strategy(kind, &config).unwrap();
            assert_eq!(strategy.kind(), kind);
        }
    }

    #[test]
    fn test_broken_program_fails_at_construction() {
        let mut sources = PolicySources::builtin().unwrap();
        sources.set(StrategyKind::Logic, PolicyName::EntryRead, "allow(user, user");
        sources.set(StrategyKind::Datalog, PolicyName::EntryRead, "allow if actor($u");
        sources.set(StrategyKind::Declarative, PolicyName::EntryRead, "actor == ");

        for kind in [StrategyKind::Logic, StrategyKind::Datalog, StrategyKind::Declarative] {
            assert_matches!(
                build_strategy_with(kind, &sources, &KithConfig::default()),
                Err(KithError::Invalid { .. })
            );
        }
    }
}
