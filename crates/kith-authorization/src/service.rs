//! The decision core as one shareable service

use crate::friend_request::{FriendRequestAuthorizer, FriendRequestOutcome};
use crate::resolver::IdentityResolver;
use crate::resource::EntryAuthorizer;
use kith_core::{
    AuthorizationRequest, EntryId, KithConfig, Result, StrategyKind, User, UserName,
};
use kith_policy::PolicyEvaluator;
use kith_store::{EntryStore, IdentityStore};
use std::sync::Arc;

/// Identity resolution, entry reads and friend requests behind one
/// evaluator.
///
/// Holds no per-request state; share it behind an `Arc` or clone it.
#[derive(Debug, Clone)]
pub struct AuthorizationService {
    resolver: IdentityResolver,
    entries: EntryAuthorizer,
    friend_requests: FriendRequestAuthorizer,
    evaluator: PolicyEvaluator,
}

impl AuthorizationService {
    /// Build the service over one store, using the strategy named in
    /// `config`.
    pub fn new<S>(store: Arc<S>, config: &KithConfig) -> Result<Self>
    where
        S: IdentityStore + EntryStore + 'static,
    {
        let evaluator = PolicyEvaluator::from_config(config)?;
        Ok(Self::with_evaluator(
            store.clone(),
            store,
            evaluator,
            config,
        ))
    }

    /// Build the service from separate stores and an existing evaluator.
    pub fn with_evaluator(
        identities: Arc<dyn IdentityStore>,
        entries: Arc<dyn EntryStore>,
        evaluator: PolicyEvaluator,
        config: &KithConfig,
    ) -> Self {
        tracing::info!(strategy = %evaluator.strategy_kind(), "authorization service ready");
        Self {
            resolver: IdentityResolver::new(identities.clone(), evaluator.clone()),
            entries: EntryAuthorizer::new(entries, evaluator.clone()),
            friend_requests: FriendRequestAuthorizer::new(
                identities,
                evaluator.clone(),
                config.friend_requests.clone(),
            ),
            evaluator,
        }
    }

    /// Strategy answering every policy question.
    pub fn strategy_kind(&self) -> StrategyKind {
        self.evaluator.strategy_kind()
    }

    /// Resolve a raw `Authorization` header value to a user.
    #[tracing::instrument(level = "debug", skip(self, credential))]
    pub fn resolve_identity(&self, credential: Option<&str>) -> Result<User> {
        self.resolver.resolve(credential)
    }

    /// Content of `entry_id` if `actor` owns it.
    #[tracing::instrument(level = "debug", skip(self, actor), fields(actor = %actor.name))]
    pub fn authorize_entry_read(&self, actor: &User, entry_id: &EntryId) -> Result<String> {
        let request = AuthorizationRequest::new(actor.name.clone(), entry_id.as_str());
        self.entries.authorize_read(&request)
    }

    /// Send a friend request from `actor` to `candidate`.
    #[tracing::instrument(level = "debug", skip(self, actor), fields(actor = %actor.name))]
    pub fn authorize_friend_request(
        &self,
        actor: &User,
        candidate: &UserName,
    ) -> Result<FriendRequestOutcome> {
        let request = AuthorizationRequest::new(actor.name.clone(), candidate.as_str());
        self.friend_requests.authorize(&request)
    }

    /// Name of the user holding `credential`.
    pub fn whoami(&self, credential: Option<&str>) -> Result<UserName> {
        self.resolve_identity(credential).map(|user| user.name)
    }

    /// Resolve `credential`, then read `entry_id` as that user.
    pub fn read_entry(&self, credential: Option<&str>, entry_id: &EntryId) -> Result<String> {
        let actor = self.resolve_identity(credential)?;
        self.authorize_entry_read(&actor, entry_id)
    }

    /// Resolve `credential`, then send a friend request to `candidate`.
    pub fn send_friend_request(
        &self,
        credential: Option<&str>,
        candidate: &UserName,
    ) -> Result<FriendRequestOutcome> {
        let actor = self.resolve_identity(credential)?;
        self.authorize_friend_request(&actor, candidate)
    }
}
