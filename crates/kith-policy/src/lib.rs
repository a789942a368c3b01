//! Kith Policy - policy evaluation contract and strategies
//!
//! Every decision the core makes is phrased as a policy question answered
//! over a bag of named facts:
//!
//! - `identity.match`: `presented`, `stored_token`
//! - `entry.read`: `actor`, `owner`
//! - `friend.request`: `actor`, `target`, graph `friends`
//!
//! `PolicyEvaluator` wraps one `PolicyStrategy` and turns its answer into a
//! `Verdict`, failing closed on any strategy error. Four strategies are
//! interchangeable by configuration:
//!
//! - `native`: plain Rust
//! - `datalog`: Biscuit's Datalog authorizer (forward chaining)
//! - `logic`: an in-crate Horn-clause prover (backward chaining)
//! - `declarative`: boolean expressions from a policy document
//!
//! For identical facts all four return identical verdicts.
//!
//! # Example
//!
//! ```
//! use kith_core::{KithConfig, StrategyKind, UserName};
//! use kith_policy::{Facts, PolicyEvaluator, PolicyName};
//!
//! let evaluator = PolicyEvaluator::with_strategy(StrategyKind::Datalog, &KithConfig::default())?;
//! let alice = UserName::from("Alice");
//! let verdict = evaluator.evaluate(PolicyName::EntryRead, &Facts::entry_read(&alice, &alice));
//! assert!(verdict.allowed);
//! # Ok::<(), kith_core::KithError>(())
//! ```

pub mod error;
pub mod evaluator;
pub mod facts;
pub mod policy;
pub mod sources;
pub mod strategies;

pub use error::EvaluationError;
pub use evaluator::PolicyEvaluator;
pub use facts::{Binding, Facts};
pub use policy::PolicyName;
pub use sources::PolicySources;
pub use strategies::{
    build_strategy, build_strategy_with, DatalogStrategy, DeclarativeStrategy, LogicStrategy,
    NativeStrategy, PolicyStrategy,
};
