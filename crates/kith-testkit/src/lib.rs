//! Kith Testing Infrastructure
//!
//! Shared fixtures for tests across the workspace: the reference users and
//! entries, stores seeded with them, per-strategy configurations and
//! assertions over failure reasons.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! kith-testkit = { path = "../kith-testkit" }
//! ```
//!
//! ```rust,no_run
//! use kith_testkit::*;
//!
//! let store = reference_store();
//! let config = config_for(kith_core::StrategyKind::Logic);
//! ```

pub mod assertions;
pub mod config;
pub mod fixtures;

pub use assertions::*;
pub use config::*;
pub use fixtures::*;
