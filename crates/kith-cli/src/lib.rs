//! Kith CLI library
//!
//! Flag handling lives in the `kith` binary; this crate holds the command
//! handlers so they can be tested without spawning a process.

pub mod commands;
pub mod context;

pub use commands::agree::{AgreementReport, Disagreement};
pub use context::{CliContext, REFERENCE_SEED};
