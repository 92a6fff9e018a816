//! In-memory ledger

use std::collections::HashMap;

use coffer_core::{AccountId, Amount};

use crate::error::LedgerError;
use crate::Ledger;

/// HashMap-backed ledger
///
/// Holds no history of its own; the account journal is the source of truth
/// and a fresh `InMemoryLedger` is rebuilt by replaying it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balances: HashMap<AccountId, Amount>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts with a recorded balance
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// All non-zero balances, sorted by account
    pub fn balances(&self) -> Vec<(AccountId, Amount)> {
        let mut out: Vec<_> = self
            .balances
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(account, amount)| (account.clone(), *amount))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

impl Ledger for InMemoryLedger {
    fn balance(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    fn credit(&mut self, account: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        let updated = self
            .balance(account)
            .checked_add(&amount)
            .ok_or_else(|| LedgerError::Overflow(account.clone()))?;
        self.balances.insert(account.clone(), updated);
        Ok(())
    }

    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let available = self.balance(from);
        let debited = available
            .checked_sub(&amount)
            .ok_or_else(|| LedgerError::InsufficientFunds {
                account: from.clone(),
                available,
                required: amount,
            })?;

        if from == to {
            return Ok(());
        }

        // Compute the credit before touching either balance
        let credited = self
            .balance(to)
            .checked_add(&amount)
            .ok_or_else(|| LedgerError::Overflow(to.clone()))?;

        self.balances.insert(from.clone(), debited);
        self.balances.insert(to.clone(), credited);

        tracing::debug!(from = %from, to = %to, amount = %amount, "Ledger transfer applied");
        Ok(())
    }
}
