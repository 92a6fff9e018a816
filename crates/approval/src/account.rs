//! Checking account: the single serialization point
//!
//! Every mutating call takes the account lock, decides, journals, applies
//! and notifies before releasing it. Two concurrent signatures on the same
//! transaction therefore can never both cross the threshold.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use coffer_authorizers::{AccessPolicy, Authorizer};
use coffer_core::{AccountId, Amount, TxId};
use coffer_events::{
    verify_chain, AccountEvent, EventError, EventStore, EventSubscriber, JournalRecord,
};
use coffer_ledger::{InMemoryLedger, Ledger};

use crate::config::ApprovalConfig;
use crate::engine::{opening_event, ApprovalEngine};
use crate::error::ApprovalError;
use crate::pending::{OwnershipTransfer, PendingTransaction, Withdrawal};

/// Result of a successful signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutcome {
    /// Recorded; more signatures are needed
    Pending { signatures: usize, required: usize },

    /// Threshold reached, effect applied and entry removed
    Executed,
}

struct Inner<L: Ledger> {
    engine: ApprovalEngine<L>,
    journal: Option<EventStore>,
}

/// Configures and opens (or restores) a [`CheckingAccount`]
pub struct AccountBuilder<L: Ledger> {
    config: ApprovalConfig,
    ledger: L,
    journal: Option<EventStore>,
    subscribers: Vec<Arc<dyn EventSubscriber>>,
    policy: Option<Arc<dyn AccessPolicy>>,
}

impl<L: Ledger> AccountBuilder<L> {
    pub fn new(config: ApprovalConfig, ledger: L) -> Self {
        Self {
            config,
            ledger,
            journal: None,
            subscribers: Vec::new(),
            policy: None,
        }
    }

    /// Persist every committed event to `journal`
    pub fn journal(mut self, journal: EventStore) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Notified under the account lock; see [`EventSubscriber`]
    pub fn subscriber(mut self, subscriber: Arc<dyn EventSubscriber>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Override the policy selected by `config.administration`
    pub fn access_policy(mut self, policy: Arc<dyn AccessPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Open a new account whose owner and first authorizer is `creator`
    pub fn open(self, creator: AccountId) -> Result<CheckingAccount<L>, ApprovalError> {
        self.config.validate()?;

        let mut journal = self.journal;
        if let Some(store) = &journal {
            if store.last_sequence() != 0 {
                return Err(ApprovalError::Inconsistent(format!(
                    "journal at {} already holds an account",
                    store.base_path().display()
                )));
            }
        }

        let policy = self
            .policy
            .unwrap_or_else(|| self.config.administration.build());
        let event = opening_event(creator, &self.config);
        if let Some(store) = journal.as_mut() {
            store.append(event.clone())?;
        }
        let engine = ApprovalEngine::open(&event, self.config, self.ledger, policy)?;

        tracing::info!(
            account = %engine.account(),
            owner = %engine.owner(),
            policy = engine.policy().name(),
            "Checking account opened"
        );

        let account = CheckingAccount {
            inner: Mutex::new(Inner { engine, journal }),
            subscribers: self.subscribers,
        };
        account.notify(&event);
        Ok(account)
    }

    /// Rebuild an account by replaying journal records in order.
    ///
    /// The chain is verified first. Subscribers are not notified of
    /// replayed events.
    pub fn restore(self, records: &[JournalRecord]) -> Result<CheckingAccount<L>, ApprovalError> {
        self.config.validate()?;
        verify_chain(records).map_err(EventError::from)?;

        let (first, rest) = records
            .split_first()
            .ok_or_else(|| ApprovalError::Inconsistent("journal is empty".to_string()))?;

        if let Some(store) = &self.journal {
            let last = records.last().map_or(0, |record| record.sequence);
            if store.last_sequence() != last {
                return Err(ApprovalError::Inconsistent(format!(
                    "journal ends at sequence {}, records end at {}",
                    store.last_sequence(),
                    last
                )));
            }
        }

        let policy = self
            .policy
            .unwrap_or_else(|| self.config.administration.build());
        let mut engine = ApprovalEngine::open(&first.event, self.config, self.ledger, policy)?;

        for record in rest {
            engine.apply(&record.event).map_err(|e| {
                ApprovalError::Inconsistent(format!("record {}: {}", record.sequence, e))
            })?;
        }

        tracing::info!(
            account = %engine.account(),
            records = records.len(),
            "Checking account restored"
        );

        Ok(CheckingAccount {
            inner: Mutex::new(Inner {
                engine,
                journal: self.journal,
            }),
            subscribers: self.subscribers,
        })
    }
}

/// A multi-signature checking account
pub struct CheckingAccount<L: Ledger> {
    inner: Mutex<Inner<L>>,
    subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl CheckingAccount<InMemoryLedger> {
    /// Unjournaled account over a fresh in-memory ledger
    pub fn in_memory(creator: AccountId, config: ApprovalConfig) -> Result<Self, ApprovalError> {
        AccountBuilder::new(config, InMemoryLedger::new()).open(creator)
    }
}

impl<L: Ledger> CheckingAccount<L> {
    pub fn builder(config: ApprovalConfig, ledger: L) -> AccountBuilder<L> {
        AccountBuilder::new(config, ledger)
    }

    // State is only mutated after a decision succeeds, so a poisoned lock
    // still guards consistent state.
    fn lock(&self) -> MutexGuard<'_, Inner<L>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decide, journal, apply and notify under one lock acquisition
    fn commit<T>(
        &self,
        action: &'static str,
        decide: impl FnOnce(&ApprovalEngine<L>) -> Result<AccountEvent, ApprovalError>,
        outcome: impl FnOnce(&ApprovalEngine<L>, &AccountEvent) -> T,
    ) -> Result<T, ApprovalError> {
        let mut inner = self.lock();

        let event = match decide(&inner.engine) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(action, error = %err, "Operation rejected");
                return Err(err);
            }
        };

        if let Some(journal) = inner.journal.as_mut() {
            journal.append(event.clone())?;
        }
        if let Err(err) = inner.engine.apply(&event) {
            tracing::error!(action, error = %err, "Committed event could not be applied");
            return Err(err);
        }

        tracing::info!(
            action,
            event = event.kind(),
            actor = %event.actor(),
            "Operation committed"
        );

        let result = outcome(&inner.engine, &event);
        self.notify(&event);
        Ok(result)
    }

    fn notify(&self, event: &AccountEvent) {
        for subscriber in &self.subscribers {
            if let Err(err) = subscriber.handle(event) {
                tracing::warn!(
                    subscriber = subscriber.name(),
                    error = %err,
                    "Subscriber failed"
                );
            }
        }
    }

    fn sign_outcome(signatures: Option<usize>, required: usize, event: &AccountEvent) -> SignOutcome {
        if event.is_execution() {
            SignOutcome::Executed
        } else {
            SignOutcome::Pending {
                signatures: signatures.unwrap_or_default(),
                required,
            }
        }
    }

    // --- Operations ---

    /// Receive funds; no authorization gate
    pub fn deposit(&self, from: &AccountId, amount: Amount) -> Result<(), ApprovalError> {
        self.commit("deposit", |e| e.decide_deposit(from, amount), |_, _| ())
    }

    pub fn add_authorizer(
        &self,
        caller: &AccountId,
        candidate: &AccountId,
        level: u32,
    ) -> Result<(), ApprovalError> {
        self.commit(
            "add_authorizer",
            |e| e.decide_add_authorizer(caller, candidate, level),
            |_, _| (),
        )
    }

    pub fn remove_authorizer(
        &self,
        caller: &AccountId,
        target: &AccountId,
    ) -> Result<(), ApprovalError> {
        self.commit(
            "remove_authorizer",
            |e| e.decide_remove_authorizer(caller, target),
            |_, _| (),
        )
    }

    /// Propose paying `amount` to `destination`; returns the withdrawal id
    pub fn propose_withdrawal(
        &self,
        proposer: &AccountId,
        destination: &AccountId,
        amount: Amount,
        tag: u64,
    ) -> Result<TxId, ApprovalError> {
        let now = Utc::now();
        self.commit(
            "propose_withdrawal",
            |e| e.decide_propose_withdrawal(proposer, destination, amount, tag, now),
            |_, event| event.transaction_id(),
        )?
        .ok_or_else(|| ApprovalError::Inconsistent("proposal without id".to_string()))
    }

    pub fn sign_withdrawal(&self, signer: &AccountId, id: TxId) -> Result<SignOutcome, ApprovalError> {
        self.commit(
            "sign_withdrawal",
            |e| e.decide_sign_withdrawal(signer, id),
            |e, event| Self::sign_outcome(e.withdrawal_signatures(id), e.config().threshold(), event),
        )
    }

    pub fn delete_withdrawal(&self, caller: &AccountId, id: TxId) -> Result<(), ApprovalError> {
        self.commit(
            "delete_withdrawal",
            |e| e.decide_delete_withdrawal(caller, id),
            |_, _| (),
        )
    }

    /// Propose handing the account to `new_owner`; returns the transfer id
    pub fn propose_ownership_transfer(
        &self,
        proposer: &AccountId,
        new_owner: &AccountId,
    ) -> Result<TxId, ApprovalError> {
        let now = Utc::now();
        self.commit(
            "propose_ownership_transfer",
            |e| e.decide_propose_ownership_transfer(proposer, new_owner, now),
            |_, event| event.transaction_id(),
        )?
        .ok_or_else(|| ApprovalError::Inconsistent("proposal without id".to_string()))
    }

    pub fn sign_ownership_transfer(
        &self,
        signer: &AccountId,
        id: TxId,
    ) -> Result<SignOutcome, ApprovalError> {
        self.commit(
            "sign_ownership_transfer",
            |e| e.decide_sign_ownership_transfer(signer, id),
            |e, event| {
                Self::sign_outcome(e.ownership_transfer_signatures(id), e.config().threshold(), event)
            },
        )
    }

    pub fn delete_ownership_transfer(&self, caller: &AccountId, id: TxId) -> Result<(), ApprovalError> {
        self.commit(
            "delete_ownership_transfer",
            |e| e.decide_delete_ownership_transfer(caller, id),
            |_, _| (),
        )
    }

    // --- Queries ---

    /// Run a read-only closure against a consistent snapshot of the state
    pub fn inspect<T>(&self, f: impl FnOnce(&ApprovalEngine<L>) -> T) -> T {
        f(&self.lock().engine)
    }

    pub fn account_id(&self) -> AccountId {
        self.inspect(|e| e.account().clone())
    }

    pub fn owner(&self) -> AccountId {
        self.inspect(|e| e.owner().clone())
    }

    pub fn is_authorizer(&self, account: &AccountId) -> bool {
        self.inspect(|e| e.registry().contains(account))
    }

    pub fn authorizer_count(&self) -> usize {
        self.inspect(|e| e.registry().count())
    }

    pub fn authorizers(&self) -> Vec<Authorizer> {
        self.inspect(|e| e.registry().iter().cloned().collect())
    }

    /// Balance of the checking account
    pub fn balance(&self) -> Amount {
        self.inspect(|e| e.balance())
    }

    /// Balance of any account on the underlying ledger
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.inspect(|e| e.ledger().balance(account))
    }

    pub fn get_withdrawal(&self, id: TxId) -> Option<PendingTransaction<Withdrawal>> {
        self.inspect(|e| e.withdrawals().get(id).cloned())
    }

    pub fn get_ownership_transfer(&self, id: TxId) -> Option<PendingTransaction<OwnershipTransfer>> {
        self.inspect(|e| e.ownership_transfers().get(id).cloned())
    }

    pub fn pending_withdrawals(&self) -> Vec<PendingTransaction<Withdrawal>> {
        self.inspect(|e| e.withdrawals().iter().cloned().collect())
    }

    pub fn pending_ownership_transfers(&self) -> Vec<PendingTransaction<OwnershipTransfer>> {
        self.inspect(|e| e.ownership_transfers().iter().cloned().collect())
    }

    pub fn config(&self) -> ApprovalConfig {
        self.inspect(|e| e.config().clone())
    }
}
