//! Mapping verdicts onto the error vocabulary

use kith_core::{KithError, Result, Verdict};

/// Turn a verdict into `Ok(())` or the error a caller should see.
///
/// A denial becomes whatever `denied` builds; an internal failure always
/// becomes `KithError::Internal`, whatever the decision.
pub(crate) fn enforce(verdict: Verdict, denied: impl FnOnce() -> KithError) -> Result<()> {
    if verdict.allowed {
        return Ok(());
    }
    if verdict.is_internal_failure() {
        let detail = verdict
            .detail
            .unwrap_or_else(|| "policy evaluation failed".to_string());
        return Err(KithError::internal(detail));
    }
    Err(denied())
}
