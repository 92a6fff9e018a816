//! Registry errors

use coffer_core::AccountId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Authorizer capacity of {capacity} reached")]
    CapacityExceeded { capacity: usize },

    #[error("{0} is already an authorizer")]
    DuplicateAuthorizer(AccountId),

    #[error("{0} is not an authorizer")]
    NotAnAuthorizer(AccountId),
}
