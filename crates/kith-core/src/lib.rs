//! Kith Core - shared vocabulary for the decision core
//!
//! This crate holds the types every other kith crate speaks:
//!
//! - Identifiers: `UserName`, `EntryId`, `Token`
//! - Records: `User`, `Entry`
//! - Decisions: `AuthorizationRequest`, `Verdict`, `FailureReason`
//! - Errors: the unified `KithError`
//! - Configuration: `KithConfig` and strategy selection
//!
//! It has no behavior beyond construction, validation and error mapping.

pub mod config;
pub mod domain;
pub mod errors;
pub mod identifiers;

pub use config::{DatalogLimits, FriendRequestConfig, KithConfig, LogicLimits, StrategyKind};
pub use domain::{AuthorizationRequest, Entry, User, Verdict};
pub use errors::{FailureReason, KithError, Result};
pub use identifiers::{EntryId, Token, UserName};
