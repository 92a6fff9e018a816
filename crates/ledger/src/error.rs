//! Ledger errors

use coffer_core::{AccountId, Amount};
use thiserror::Error;

/// Errors that can occur in ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient funds in {account}: available {available}, required {required}")]
    InsufficientFunds {
        account: AccountId,
        available: Amount,
        required: Amount,
    },

    #[error("Balance overflow on {0}")]
    Overflow(AccountId),
}
