//! Strategy-level evaluation errors

use crate::policy::PolicyName;
use kith_core::{KithError, StrategyKind};
use thiserror::Error;

/// Why a strategy could not produce a verdict.
///
/// Every variant is an internal failure from the caller's point of view; none
/// of them may be read as a denial.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// A binding the policy needs was not supplied
    #[error("missing binding `{name}`")]
    MissingBinding {
        /// Binding name
        name: String,
    },

    /// A binding was supplied with the wrong shape
    #[error("binding `{name}` must be {expected}")]
    WrongBindingType {
        /// Binding name
        name: String,
        /// Expected shape, e.g. "text" or "a friendship graph"
        expected: &'static str,
    },

    /// Policy source text could not be parsed
    #[error("failed to parse {policy} policy: {message}")]
    Parse {
        /// Policy being parsed
        policy: PolicyName,
        /// Parser diagnostic
        message: String,
    },

    /// The evaluation engine failed while running
    #[error("evaluation engine error: {message}")]
    Engine {
        /// Engine diagnostic
        message: String,
    },

    /// Proof search ran out of resolution steps
    #[error("proof search exceeded its budget of {limit} steps")]
    StepLimit {
        /// Step budget for this evaluation
        limit: u64,
    },

    /// The strategy has no program for this policy
    #[error("{strategy} strategy has no program for {policy}")]
    UnsupportedPolicy {
        /// Strategy asked
        strategy: StrategyKind,
        /// Policy requested
        policy: PolicyName,
    },
}

impl EvaluationError {
    /// Create a parse error.
    pub fn parse(policy: PolicyName, message: impl Into<String>) -> Self {
        Self::Parse {
            policy,
            message: message.into(),
        }
    }

    /// Create an engine error.
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }

    /// Create a missing-binding error.
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingBinding { name: name.into() }
    }
}

impl From<EvaluationError> for KithError {
    fn from(err: EvaluationError) -> Self {
        KithError::internal(err.to_string())
    }
}
