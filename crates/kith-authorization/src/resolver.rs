//! Bearer credential to identity

use crate::decision::enforce;
use kith_core::{KithError, Result, User};
use kith_policy::{Facts, PolicyEvaluator, PolicyName};
use kith_store::IdentityStore;
use std::sync::Arc;

/// Scheme prefix every credential must carry.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Pull the token out of a raw `Authorization` header value.
///
/// An absent or empty header is `Unauthenticated`; anything not in the
/// Bearer scheme is `MalformedCredential`. Whitespace around the token is
/// ignored.
pub fn extract_bearer_token(raw_header: Option<&str>) -> Result<&str> {
    let header = match raw_header {
        None | Some("") => return Err(KithError::unauthenticated("missing credential")),
        Some(header) => header,
    };

    match header.strip_prefix(BEARER_PREFIX) {
        Some(token) => Ok(token.trim()),
        None => Err(KithError::malformed_credential(
            "expected a Bearer credential",
        )),
    }
}

/// Resolves raw credentials to user records.
#[derive(Clone)]
pub struct IdentityResolver {
    identities: Arc<dyn IdentityStore>,
    evaluator: PolicyEvaluator,
}

impl IdentityResolver {
    /// Create a resolver over `identities`.
    pub fn new(identities: Arc<dyn IdentityStore>, evaluator: PolicyEvaluator) -> Self {
        Self {
            identities,
            evaluator,
        }
    }

    /// Resolve `raw_header` to the user holding its token.
    ///
    /// The store proposes a candidate and the `identity.match` policy has
    /// the last word, so a strategy can never admit a token the store did
    /// not hold.
    pub fn resolve(&self, raw_header: Option<&str>) -> Result<User> {
        let token = extract_bearer_token(raw_header)?;

        let candidate = match self.identities.lookup_by_token(token) {
            Ok(user) => user,
            Err(KithError::NotFound { .. }) => {
                tracing::debug!("presented token matches no identity");
                return Err(KithError::unauthenticated("unknown credential"));
            }
            Err(e) => return Err(e),
        };

        let verdict = self.evaluator.evaluate(
            PolicyName::IdentityMatch,
            &Facts::identity_match(token, candidate.token.expose()),
        );
        enforce(verdict, || KithError::unauthenticated("unknown credential"))?;

        tracing::debug!(user = %candidate.name, "identity resolved");
        Ok(candidate)
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("strategy", &self.evaluator.strategy_kind())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use kith_core::{KithConfig, UserName};
    use kith_testkit::{bearer, reference_store};

    fn resolver() -> IdentityResolver {
        let evaluator = PolicyEvaluator::from_config(&KithConfig::default()).unwrap();
        IdentityResolver::new(reference_store(), evaluator)
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(Some("Bearer 123")).unwrap(), "123");
        assert_eq!(extract_bearer_token(Some("Bearer   456  ")).unwrap(), "456");
        assert_eq!(extract_bearer_token(Some("Bearer ")).unwrap(), "");
        assert_matches!(
            extract_bearer_token(None),
            Err(KithError::Unauthenticated { .. })
        );
        assert_matches!(
            extract_bearer_token(Some("")),
            Err(KithError::Unauthenticated { .. })
        );
        assert_matches!(
            extract_bearer_token(Some("123")),
            Err(KithError::MalformedCredential { .. })
        );
        assert_matches!(
            extract_bearer_token(Some("bearer 123")),
            Err(KithError::MalformedCredential { .. })
        );
    }

    #[test]
    fn test_resolve_reference_user() {
        let user = resolver().resolve(Some(&bearer("Charlie"))).unwrap();
        assert_eq!(user.name, UserName::from("Charlie"));
    }

    #[test]
    fn test_empty_token_is_unauthenticated() {
        assert_matches!(
            resolver().resolve(Some("Bearer    ")),
            Err(KithError::Unauthenticated { .. })
        );
    }
}
