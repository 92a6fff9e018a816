//! Access policies
//!
//! Administration (adding or removing authorizers) and deletion of pending
//! transactions are gated by a swappable policy.

use coffer_core::AccountId;

use crate::registry::AuthorizerRegistry;

/// Decides who may administer the authorizer set and delete proposals
pub trait AccessPolicy: Send + Sync {
    /// Policy name (for logging)
    fn name(&self) -> &str;

    /// May `caller` add or remove authorizers?
    fn can_administer(
        &self,
        caller: &AccountId,
        owner: &AccountId,
        registry: &AuthorizerRegistry,
    ) -> bool;

    /// May `caller` delete a pending transaction proposed by `proposer`?
    ///
    /// Defaults to the proposer, the owner, or any current authorizer.
    fn can_delete(
        &self,
        caller: &AccountId,
        proposer: &AccountId,
        owner: &AccountId,
        registry: &AuthorizerRegistry,
    ) -> bool {
        caller == proposer || caller == owner || registry.contains(caller)
    }
}

/// Any registered authorizer, or the owner, may administer
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizersOrOwner;

impl AccessPolicy for AuthorizersOrOwner {
    fn name(&self) -> &str {
        "authorizers_or_owner"
    }

    fn can_administer(
        &self,
        caller: &AccountId,
        owner: &AccountId,
        registry: &AuthorizerRegistry,
    ) -> bool {
        caller == owner || registry.contains(caller)
    }
}

/// Only the current owner may administer
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerOnly;

impl AccessPolicy for OwnerOnly {
    fn name(&self) -> &str {
        "owner_only"
    }

    fn can_administer(
        &self,
        caller: &AccountId,
        owner: &AccountId,
        _registry: &AuthorizerRegistry,
    ) -> bool {
        caller == owner
    }
}
