//! Assertions over decision outcomes

use kith_core::{FailureReason, Result};
use std::fmt::Debug;

/// Assert that `result` failed for `expected`, returning the error message.
#[track_caller]
pub fn assert_failure<T: Debug>(result: Result<T>, expected: FailureReason) -> String {
    match result {
        Ok(value) => panic!("expected {expected}, got Ok({value:?})"),
        Err(err) => {
            assert_eq!(err.reason(), expected, "unexpected error: {err}");
            err.to_string()
        }
    }
}

/// Assert that `result` succeeded, returning the value.
#[track_caller]
pub fn assert_allowed<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("expected success, got {} ({err})", err.reason()),
    }
}
