//! Coffer Ledger - Balance capability
//!
//! Checking accounts never own balances directly. They are handed a
//! [`Ledger`] that answers balance queries and moves value, so the approval
//! logic can be exercised against any backing store.
//!
//! # Key Types
//! - `Ledger`: The capability trait
//! - `InMemoryLedger`: HashMap-backed implementation, rebuilt by journal replay
//! - `LedgerError`: Failures surfaced by ledger operations

pub mod error;
pub mod memory;

pub use error::LedgerError;
pub use memory::InMemoryLedger;

use coffer_core::{AccountId, Amount};

/// Balance capability supplied to a checking account
pub trait Ledger: Send {
    /// Current balance of `account` (zero for unknown accounts)
    fn balance(&self, account: &AccountId) -> Amount;

    /// Increase the balance of `account`
    fn credit(&mut self, account: &AccountId, amount: Amount) -> Result<(), LedgerError>;

    /// Move `amount` from `from` to `to`.
    ///
    /// Must leave both balances untouched when it fails.
    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Check that `account` could pay `amount` right now
    fn ensure_available(&self, account: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        let available = self.balance(account);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                account: account.clone(),
                available,
                required: amount,
            });
        }
        Ok(())
    }
}
