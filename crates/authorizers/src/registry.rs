//! Authorizer registry

use coffer_core::AccountId;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Maximum number of authorizers, creator included
pub const DEFAULT_CAPACITY: usize = 10;

/// An account with co-signing rights
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorizer {
    pub account: AccountId,

    /// Opaque level attached when the authorizer was added
    pub level: u32,
}

/// Bounded, insertion-ordered set of authorizers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizerRegistry {
    entries: Vec<Authorizer>,
    capacity: usize,
}

impl AuthorizerRegistry {
    /// Create an empty registry
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Create a registry whose first member is the account creator
    pub fn with_creator(creator: AccountId, level: u32, capacity: usize) -> Self {
        let mut registry = Self::new(capacity);
        registry.entries.push(Authorizer {
            account: creator,
            level,
        });
        registry
    }

    /// Validate an addition without applying it
    pub fn check_add(&self, candidate: &AccountId) -> Result<(), RegistryError> {
        if self.is_full() {
            return Err(RegistryError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        if self.contains(candidate) {
            return Err(RegistryError::DuplicateAuthorizer(candidate.clone()));
        }
        Ok(())
    }

    /// Add an authorizer
    pub fn add(&mut self, candidate: AccountId, level: u32) -> Result<(), RegistryError> {
        self.check_add(&candidate)?;
        tracing::debug!(authorizer = %candidate, level, "Authorizer registered");
        self.entries.push(Authorizer {
            account: candidate,
            level,
        });
        Ok(())
    }

    /// Validate a removal without applying it
    pub fn check_remove(&self, target: &AccountId) -> Result<(), RegistryError> {
        if !self.contains(target) {
            return Err(RegistryError::NotAnAuthorizer(target.clone()));
        }
        Ok(())
    }

    /// Remove an authorizer, returning its entry
    pub fn remove(&mut self, target: &AccountId) -> Result<Authorizer, RegistryError> {
        let index = self
            .entries
            .iter()
            .position(|a| &a.account == target)
            .ok_or_else(|| RegistryError::NotAnAuthorizer(target.clone()))?;
        tracing::debug!(authorizer = %target, "Authorizer unregistered");
        Ok(self.entries.remove(index))
    }

    pub fn contains(&self, account: &AccountId) -> bool {
        self.entries.iter().any(|a| &a.account == account)
    }

    pub fn get(&self, account: &AccountId) -> Option<&Authorizer> {
        self.entries.iter().find(|a| &a.account == account)
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Authorizer> {
        self.entries.iter()
    }
}
