//! Approval errors
//!
//! Component errors (registry, store, ledger) are flattened into one
//! taxonomy so callers can match on the exact cause.

use coffer_authorizers::RegistryError;
use coffer_core::{AccountId, Amount, TxId};
use coffer_events::EventError;
use coffer_ledger::LedgerError;
use thiserror::Error;

use crate::pending::TransactionKind;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("{caller} is not allowed to {action}")]
    Unauthorized {
        caller: AccountId,
        action: &'static str,
    },

    #[error("Authorizer capacity of {capacity} reached")]
    CapacityExceeded { capacity: usize },

    #[error("{0} is already an authorizer")]
    DuplicateAuthorizer(AccountId),

    #[error("{0} is not an authorizer")]
    NotAnAuthorizer(AccountId),

    #[error("{0} is the account owner and cannot be removed")]
    ProtectedAuthorizer(AccountId),

    #[error("{kind} {id} not found")]
    NotFound { kind: TransactionKind, id: TxId },

    #[error("Proposer cannot sign own {kind} {id}")]
    SelfApproval { kind: TransactionKind, id: TxId },

    #[error("Beneficiary cannot sign {kind} {id}")]
    BeneficiaryApproval { kind: TransactionKind, id: TxId },

    #[error("{signer} already signed {kind} {id}")]
    AlreadySigned {
        kind: TransactionKind,
        id: TxId,
        signer: AccountId,
    },

    #[error("Insufficient funds: available {available}, required {required}")]
    InsufficientFunds { available: Amount, required: Amount },

    #[error("Ledger error: {0}")]
    Ledger(LedgerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Journal error: {0}")]
    Journal(#[from] EventError),

    #[error("Journal does not match account state: {0}")]
    Inconsistent(String),
}

impl ApprovalError {
    pub(crate) fn unauthorized(caller: &AccountId, action: &'static str) -> Self {
        ApprovalError::Unauthorized {
            caller: caller.clone(),
            action,
        }
    }
}

impl From<RegistryError> for ApprovalError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::CapacityExceeded { capacity } => {
                ApprovalError::CapacityExceeded { capacity }
            }
            RegistryError::DuplicateAuthorizer(account) => {
                ApprovalError::DuplicateAuthorizer(account)
            }
            RegistryError::NotAnAuthorizer(account) => ApprovalError::NotAnAuthorizer(account),
        }
    }
}

impl From<StoreError> for ApprovalError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => ApprovalError::NotFound { kind, id },
            StoreError::SelfApproval { kind, id } => ApprovalError::SelfApproval { kind, id },
            StoreError::BeneficiaryApproval { kind, id } => {
                ApprovalError::BeneficiaryApproval { kind, id }
            }
            StoreError::AlreadySigned { kind, id, signer } => {
                ApprovalError::AlreadySigned { kind, id, signer }
            }
        }
    }
}

impl From<LedgerError> for ApprovalError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds {
                available,
                required,
                ..
            } => ApprovalError::InsufficientFunds {
                available,
                required,
            },
            other => ApprovalError::Ledger(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AccountId {
        s.parse().unwrap()
    }

    #[test]
    fn test_store_errors_flatten() {
        let err: ApprovalError = StoreError::AlreadySigned {
            kind: TransactionKind::Withdrawal,
            id: TxId(1),
            signer: id("first"),
        }
        .into();
        assert!(matches!(err, ApprovalError::AlreadySigned { id: TxId(1), .. }));
        assert_eq!(err.to_string(), "FIRST already signed withdrawal #1");
    }

    #[test]
    fn test_registry_errors_flatten() {
        let err: ApprovalError = RegistryError::CapacityExceeded { capacity: 10 }.into();
        assert!(matches!(err, ApprovalError::CapacityExceeded { capacity: 10 }));
    }

    #[test]
    fn test_ledger_errors_flatten() {
        let err: ApprovalError = LedgerError::InsufficientFunds {
            account: id("chk-1"),
            available: Amount::from_units(5),
            required: Amount::from_units(10),
        }
        .into();
        assert!(matches!(err, ApprovalError::InsufficientFunds { .. }));

        let err: ApprovalError = LedgerError::Overflow(id("chk-1")).into();
        assert!(matches!(err, ApprovalError::Ledger(_)));
    }
}
