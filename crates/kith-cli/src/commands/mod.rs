//! Subcommand handlers
//!
//! Handlers return the text to print. Decision failures become errors
//! carrying the failure reason and its HTTP status.

pub mod agree;
pub mod decisions;
pub mod graph;

use kith_core::KithError;

/// Describe a decision failure the way a transport layer would answer it.
pub fn describe_failure(err: &KithError) -> String {
    format!("{} ({}): {err}", err.reason(), err.http_status())
}
