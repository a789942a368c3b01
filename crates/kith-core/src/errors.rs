//! Unified error system for kith
//!
//! Every component signals one of a small, closed set of error kinds. The
//! transport layer maps [`FailureReason`] to an outward status and never
//! inspects component internals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error type for all kith operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum KithError {
    /// Missing credential, or a credential that matches no identity
    #[error("Unauthenticated: {message}")]
    Unauthenticated {
        /// What was missing or unmatched
        message: String,
    },

    /// Credential present but not in the expected scheme
    #[error("Malformed credential: {message}")]
    MalformedCredential {
        /// Why the credential could not be parsed
        message: String,
    },

    /// Referenced resource or candidate identity does not exist
    #[error("Not found: {message}")]
    NotFound {
        /// What was not found
        message: String,
    },

    /// Identity resolved and resource exists, but the policy said no
    #[error("Denied: {message}")]
    Denied {
        /// Which decision denied the request
        message: String,
    },

    /// The evaluation machinery itself failed
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal failure
        message: String,
    },

    /// Invalid configuration or seed data, raised at startup
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },
}

impl KithError {
    /// Create an unauthenticated error
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    /// Create a malformed credential error
    pub fn malformed_credential(message: impl Into<String>) -> Self {
        Self::MalformedCredential {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a denied error
    pub fn denied(message: impl Into<String>) -> Self {
        Self::Denied {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// The outward failure classification for this error.
    ///
    /// Startup validation errors have no outward status of their own and are
    /// reported as internal failures if they ever reach a caller.
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::Unauthenticated { .. } => FailureReason::Unauthenticated,
            Self::MalformedCredential { .. } => FailureReason::MalformedCredential,
            Self::NotFound { .. } => FailureReason::NotFound,
            Self::Denied { .. } => FailureReason::Denied,
            Self::Internal { .. } | Self::Invalid { .. } => FailureReason::InternalFailure,
        }
    }

    /// Shorthand for `self.reason().http_status()`.
    pub fn http_status(&self) -> u16 {
        self.reason().http_status()
    }
}

/// Standard Result type for kith operations
pub type Result<T> = std::result::Result<T, KithError>;

/// Classification of a failed decision, used for outward status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Missing credential or credential matches no identity
    Unauthenticated,
    /// Credential does not parse as the expected scheme
    MalformedCredential,
    /// Referenced resource or candidate identity does not exist
    NotFound,
    /// The policy or reachability check returned false
    Denied,
    /// The evaluation strategy itself errored
    InternalFailure,
}

impl FailureReason {
    /// Total mapping from failure kind to an HTTP status code.
    ///
    /// Denials answer 401, matching the status the journaling service has
    /// always returned for a refused read or friend request.
    pub fn http_status(self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::MalformedCredential => 400,
            Self::NotFound => 404,
            Self::Denied => 401,
            Self::InternalFailure => 500,
        }
    }

    /// Stable snake_case label, used in logs and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::MalformedCredential => "malformed_credential",
            Self::NotFound => "not_found",
            Self::Denied => "denied",
            Self::InternalFailure => "internal_failure",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<std::io::Error> for KithError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = KithError::invalid("test message");
        assert!(matches!(err, KithError::Invalid { .. }));
        assert_eq!(err.to_string(), "Invalid: test message");
    }

    #[test]
    fn test_reason_mapping_is_total_and_distinct() {
        assert_eq!(
            KithError::denied("no").reason(),
            FailureReason::Denied
        );
        assert_eq!(
            KithError::internal("boom").reason(),
            FailureReason::InternalFailure
        );
        assert_ne!(
            KithError::denied("no").reason(),
            KithError::internal("boom").reason()
        );
        assert_eq!(
            KithError::invalid("bad seed").reason(),
            FailureReason::InternalFailure
        );
    }

    #[test]
    fn test_http_status() {
        assert_eq!(KithError::unauthenticated("x").http_status(), 401);
        assert_eq!(KithError::malformed_credential("x").http_status(), 400);
        assert_eq!(KithError::not_found("x").http_status(), 404);
        assert_eq!(KithError::denied("x").http_status(), 401);
        assert_eq!(KithError::internal("x").http_status(), 500);
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = KithError::from(io_err);
        assert!(matches!(err, KithError::NotFound { .. }));
    }
}
