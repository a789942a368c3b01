//! Friend requests gated on graph reachability

use crate::decision::enforce;
use kith_core::{AuthorizationRequest, FriendRequestConfig, KithError, Result, UserName};
use kith_policy::{Facts, PolicyEvaluator, PolicyName};
use kith_social::FriendshipGraph;
use kith_store::IdentityStore;
use std::sync::Arc;

/// What an allowed friend request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendRequestOutcome {
    /// User who received the request
    pub target: UserName,
    /// False only when deduplication skipped an already pending requester
    pub appended: bool,
}

/// Decides friend requests and records the allowed ones.
#[derive(Clone)]
pub struct FriendRequestAuthorizer {
    identities: Arc<dyn IdentityStore>,
    evaluator: PolicyEvaluator,
    config: FriendRequestConfig,
}

impl FriendRequestAuthorizer {
    /// Create an authorizer over `identities`.
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        evaluator: PolicyEvaluator,
        config: FriendRequestConfig,
    ) -> Self {
        Self {
            identities,
            evaluator,
            config,
        }
    }

    /// Allow `request.actor` to befriend the user named by `request.target`
    /// only if they are already connected through the friendship graph.
    ///
    /// An unknown candidate is `NotFound`. On success the actor is appended
    /// to the candidate's pending requests.
    pub fn authorize(&self, request: &AuthorizationRequest) -> Result<FriendRequestOutcome> {
        let actor = &request.actor;
        let target = self
            .identities
            .lookup_by_name(&UserName::from(request.target.as_str()))?;

        let graph = FriendshipGraph::from_users(&self.identities.users());
        tracing::debug!(
            actor = %actor,
            target = %target.name,
            users = graph.user_count(),
            edges = graph.edge_count(),
            mutual = graph.mutual_friends(actor, &target.name).len(),
            "evaluating friend request"
        );

        let verdict = self.evaluator.evaluate(
            PolicyName::FriendRequest,
            &Facts::friend_request(actor, &target.name, graph),
        );
        enforce(verdict, || {
            KithError::denied(format!("{actor} is not connected to {}", target.name))
        })?;

        let appended = self.identities.append_friend_request(
            &target.name,
            actor,
            self.config.deduplicate,
        )?;
        if appended {
            tracing::info!(requester = %actor, target = %target.name, "friend request recorded");
        } else {
            tracing::info!(
                requester = %actor,
                target = %target.name,
                "friend request already pending"
            );
        }

        Ok(FriendRequestOutcome {
            target: target.name,
            appended,
        })
    }
}

impl std::fmt::Debug for FriendRequestAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FriendRequestAuthorizer")
            .field("strategy", &self.evaluator.strategy_kind())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kith_core::KithConfig;
    use kith_testkit::{reference_store, user};

    fn authorizer(deduplicate: bool) -> (Arc<kith_store::MemoryStore>, FriendRequestAuthorizer) {
        let store = reference_store();
        let evaluator = PolicyEvaluator::from_config(&KithConfig::default()).unwrap();
        let authorizer =
            FriendRequestAuthorizer::new(store.clone(), evaluator, FriendRequestConfig { deduplicate });
        (store, authorizer)
    }

    #[test]
    fn test_repeated_requests_append_each_time_by_default() {
        let (store, authorizer) = authorizer(false);
        let request = AuthorizationRequest::new(user("Alice"), "Charlie");

        for _ in 0..2 {
            assert!(authorizer.authorize(&request).unwrap().appended);
        }
        let charlie = store.lookup_by_name(&user("Charlie")).unwrap();
        assert_eq!(charlie.pending_friend_requests, vec![user("Alice"), user("Alice")]);
    }

    #[test]
    fn test_deduplicated_requests_append_once() {
        let (store, authorizer) = authorizer(true);
        let request = AuthorizationRequest::new(user("Alice"), "Charlie");

        assert!(authorizer.authorize(&request).unwrap().appended);
        assert!(!authorizer.authorize(&request).unwrap().appended);
        let charlie = store.lookup_by_name(&user("Charlie")).unwrap();
        assert_eq!(charlie.pending_friend_requests, vec![user("Alice")]);
    }

    #[test]
    fn test_denied_request_leaves_store_untouched() {
        let (store, authorizer) = authorizer(false);
        let request = AuthorizationRequest::new(user("Alice"), "Dennis");

        assert!(authorizer.authorize(&request).is_err());
        let dennis = store.lookup_by_name(&user("Dennis")).unwrap();
        assert!(dennis.pending_friend_requests.is_empty());
    }
}
