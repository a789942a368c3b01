//! Kith Authorization - the three decisions of the journaling service
//!
//! - Who is asking: a Bearer credential resolved to a [`kith_core::User`]
//! - May they read this entry: only its owner may
//! - May they send this friend request: only to someone they are already
//!   connected to through the friendship graph
//!
//! Every decision is phrased as a policy question and answered by the
//! configured [`kith_policy::PolicyStrategy`]. Evaluation errors fail
//! closed as `KithError::Internal`, never as a denial.
//!
//! # Example
//!
//! ```
//! use kith_authorization::AuthorizationService;
//! use kith_core::{EntryId, KithConfig};
//! use kith_store::{MemoryStore, Seed};
//! use std::sync::Arc;
//!
//! let seed = Seed::default()
//!     .with_user("Alice", "123", ["Bob"])
//!     .with_user("Bob", "456", ["Alice"])
//!     .with_entry("1", "Alice", "Dear diary...");
//! let store = Arc::new(MemoryStore::from_seed(&seed)?);
//! let service = AuthorizationService::new(store, &KithConfig::default())?;
//!
//! let content = service.read_entry(Some("Bearer 123"), &EntryId::from("1"))?;
//! assert_eq!(content, "Dear diary...");
//! assert!(service.read_entry(Some("Bearer 456"), &EntryId::from("1")).is_err());
//! # Ok::<(), kith_core::KithError>(())
//! ```

mod decision;
pub mod friend_request;
pub mod resolver;
pub mod resource;
pub mod service;

pub use friend_request::{FriendRequestAuthorizer, FriendRequestOutcome};
pub use resolver::{extract_bearer_token, IdentityResolver, BEARER_PREFIX};
pub use resource::EntryAuthorizer;
pub use service::AuthorizationService;
