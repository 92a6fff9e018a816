//! Approval state machine
//!
//! `decide_*` methods validate a request against current state and return
//! the single event it would produce, without mutating anything. `apply`
//! folds a committed event into state. Live operations and journal replay
//! both go through `apply`, so a replayed account ends up identical to the
//! one that wrote the journal.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use coffer_authorizers::{AccessPolicy, AuthorizerRegistry};
use coffer_core::{AccountId, Amount, TxId};
use coffer_events::AccountEvent;
use coffer_ledger::{Ledger, LedgerError};

use crate::config::{ApprovalConfig, ProposerPolicy, RevocationPolicy};
use crate::error::ApprovalError;
use crate::pending::{OwnershipTransfer, Payload, PendingTransaction, Withdrawal};
use crate::store::PendingStore;

/// Prefix of generated checking account ids
const ACCOUNT_PREFIX: &str = "CHK";

/// The event that opens a new account for `creator`
pub fn opening_event(creator: AccountId, config: &ApprovalConfig) -> AccountEvent {
    AccountEvent::AccountOpened {
        account: AccountId::generate(ACCOUNT_PREFIX),
        owner: creator,
        level: config.creator_level,
    }
}

/// Per-kind plumbing shared by the sign and delete paths
trait Pending: Payload {
    fn store<L: Ledger>(engine: &ApprovalEngine<L>) -> &PendingStore<Self>;

    fn signed_event(id: TxId, signer: AccountId) -> AccountEvent;

    fn deleted_event(id: TxId, by: AccountId) -> AccountEvent;

    /// Event for the signature that reaches the threshold
    fn executed_event<L: Ledger>(
        engine: &ApprovalEngine<L>,
        entry: &PendingTransaction<Self>,
        signer: AccountId,
    ) -> Result<AccountEvent, ApprovalError>;
}

impl Pending for Withdrawal {
    fn store<L: Ledger>(engine: &ApprovalEngine<L>) -> &PendingStore<Self> {
        &engine.withdrawals
    }

    fn signed_event(id: TxId, signer: AccountId) -> AccountEvent {
        AccountEvent::WithdrawalSigned { id, signer }
    }

    fn deleted_event(id: TxId, by: AccountId) -> AccountEvent {
        AccountEvent::WithdrawalDeleted { id, by }
    }

    fn executed_event<L: Ledger>(
        engine: &ApprovalEngine<L>,
        entry: &PendingTransaction<Self>,
        signer: AccountId,
    ) -> Result<AccountEvent, ApprovalError> {
        let Withdrawal {
            destination,
            amount,
            ..
        } = &entry.payload;
        engine.ledger.ensure_available(&engine.account, *amount)?;
        if engine.ledger.balance(destination).checked_add(amount).is_none() {
            return Err(ApprovalError::Ledger(LedgerError::Overflow(
                destination.clone(),
            )));
        }

        Ok(AccountEvent::WithdrawalExecuted {
            id: entry.id,
            signer,
            destination: destination.clone(),
            amount: *amount,
        })
    }
}

impl Pending for OwnershipTransfer {
    fn store<L: Ledger>(engine: &ApprovalEngine<L>) -> &PendingStore<Self> {
        &engine.ownership_transfers
    }

    fn signed_event(id: TxId, signer: AccountId) -> AccountEvent {
        AccountEvent::OwnershipTransferSigned { id, signer }
    }

    fn deleted_event(id: TxId, by: AccountId) -> AccountEvent {
        AccountEvent::OwnershipTransferDeleted { id, by }
    }

    fn executed_event<L: Ledger>(
        engine: &ApprovalEngine<L>,
        entry: &PendingTransaction<Self>,
        signer: AccountId,
    ) -> Result<AccountEvent, ApprovalError> {
        Ok(AccountEvent::OwnershipTransferred {
            id: entry.id,
            signer,
            previous_owner: engine.owner.clone(),
            new_owner: entry.payload.new_owner.clone(),
        })
    }
}

/// Authoritative state of one checking account
pub struct ApprovalEngine<L: Ledger> {
    account: AccountId,
    owner: AccountId,
    registry: AuthorizerRegistry,
    withdrawals: PendingStore<Withdrawal>,
    ownership_transfers: PendingStore<OwnershipTransfer>,
    ledger: L,
    config: ApprovalConfig,
    policy: Arc<dyn AccessPolicy>,
}

impl<L: Ledger> ApprovalEngine<L> {
    /// Build the initial state from an `AccountOpened` event
    pub fn open(
        event: &AccountEvent,
        config: ApprovalConfig,
        ledger: L,
        policy: Arc<dyn AccessPolicy>,
    ) -> Result<Self, ApprovalError> {
        let AccountEvent::AccountOpened {
            account,
            owner,
            level,
        } = event
        else {
            return Err(ApprovalError::Inconsistent(format!(
                "expected account_opened, found {}",
                event.kind()
            )));
        };

        Ok(Self {
            account: account.clone(),
            owner: owner.clone(),
            registry: AuthorizerRegistry::with_creator(
                owner.clone(),
                *level,
                config.max_authorizers,
            ),
            withdrawals: PendingStore::new(),
            ownership_transfers: PendingStore::new(),
            ledger,
            config,
            policy,
        })
    }

    // --- Queries ---

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn registry(&self) -> &AuthorizerRegistry {
        &self.registry
    }

    pub fn withdrawals(&self) -> &PendingStore<Withdrawal> {
        &self.withdrawals
    }

    pub fn ownership_transfers(&self) -> &PendingStore<OwnershipTransfer> {
        &self.ownership_transfers
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn config(&self) -> &ApprovalConfig {
        &self.config
    }

    pub fn policy(&self) -> &dyn AccessPolicy {
        self.policy.as_ref()
    }

    /// Balance held by the checking account itself
    pub fn balance(&self) -> Amount {
        self.ledger.balance(&self.account)
    }

    /// Signatures on a pending withdrawal that count toward the threshold
    pub fn withdrawal_signatures(&self, id: TxId) -> Option<usize> {
        self.withdrawals.get(id).map(|entry| self.qualifying(entry))
    }

    /// Signatures on a pending ownership transfer that count toward the threshold
    pub fn ownership_transfer_signatures(&self, id: TxId) -> Option<usize> {
        self.ownership_transfers
            .get(id)
            .map(|entry| self.qualifying(entry))
    }

    fn qualifying<P: Payload>(&self, entry: &PendingTransaction<P>) -> usize {
        match self.config.revocation {
            RevocationPolicy::Freeze => entry.signature_count(),
            RevocationPolicy::Recount => entry
                .signers
                .iter()
                .filter(|signer| self.registry.contains(signer))
                .count(),
        }
    }

    // --- Decisions ---

    /// Deposits need no authorization
    pub fn decide_deposit(
        &self,
        from: &AccountId,
        amount: Amount,
    ) -> Result<AccountEvent, ApprovalError> {
        if self.balance().checked_add(&amount).is_none() {
            return Err(ApprovalError::Ledger(LedgerError::Overflow(
                self.account.clone(),
            )));
        }
        Ok(AccountEvent::Deposited {
            from: from.clone(),
            amount,
        })
    }

    pub fn decide_add_authorizer(
        &self,
        caller: &AccountId,
        candidate: &AccountId,
        level: u32,
    ) -> Result<AccountEvent, ApprovalError> {
        if !self
            .policy
            .can_administer(caller, &self.owner, &self.registry)
        {
            return Err(ApprovalError::unauthorized(caller, "add authorizers"));
        }
        self.registry.check_add(candidate)?;

        Ok(AccountEvent::AuthorizerAdded {
            by: caller.clone(),
            authorizer: candidate.clone(),
            level,
        })
    }

    pub fn decide_remove_authorizer(
        &self,
        caller: &AccountId,
        target: &AccountId,
    ) -> Result<AccountEvent, ApprovalError> {
        if !self
            .policy
            .can_administer(caller, &self.owner, &self.registry)
        {
            return Err(ApprovalError::unauthorized(caller, "remove authorizers"));
        }
        self.registry.check_remove(target)?;
        if target == &self.owner {
            return Err(ApprovalError::ProtectedAuthorizer(target.clone()));
        }

        Ok(AccountEvent::AuthorizerRemoved {
            by: caller.clone(),
            authorizer: target.clone(),
        })
    }

    pub fn decide_propose_withdrawal(
        &self,
        proposer: &AccountId,
        destination: &AccountId,
        amount: Amount,
        tag: u64,
        proposed_at: DateTime<Utc>,
    ) -> Result<AccountEvent, ApprovalError> {
        self.check_proposer(proposer, "propose withdrawals")?;

        Ok(AccountEvent::WithdrawalProposed {
            id: self.withdrawals.next_id(),
            proposer: proposer.clone(),
            destination: destination.clone(),
            amount,
            tag,
            proposed_at,
        })
    }

    pub fn decide_propose_ownership_transfer(
        &self,
        proposer: &AccountId,
        new_owner: &AccountId,
        proposed_at: DateTime<Utc>,
    ) -> Result<AccountEvent, ApprovalError> {
        self.check_proposer(proposer, "propose ownership transfers")?;

        Ok(AccountEvent::OwnershipTransferProposed {
            id: self.ownership_transfers.next_id(),
            proposer: proposer.clone(),
            new_owner: new_owner.clone(),
            proposed_at,
        })
    }

    pub fn decide_sign_withdrawal(
        &self,
        signer: &AccountId,
        id: TxId,
    ) -> Result<AccountEvent, ApprovalError> {
        self.decide_sign::<Withdrawal>(signer, id)
    }

    pub fn decide_sign_ownership_transfer(
        &self,
        signer: &AccountId,
        id: TxId,
    ) -> Result<AccountEvent, ApprovalError> {
        self.decide_sign::<OwnershipTransfer>(signer, id)
    }

    pub fn decide_delete_withdrawal(
        &self,
        caller: &AccountId,
        id: TxId,
    ) -> Result<AccountEvent, ApprovalError> {
        self.decide_delete::<Withdrawal>(caller, id)
    }

    pub fn decide_delete_ownership_transfer(
        &self,
        caller: &AccountId,
        id: TxId,
    ) -> Result<AccountEvent, ApprovalError> {
        self.decide_delete::<OwnershipTransfer>(caller, id)
    }

    fn check_proposer(&self, proposer: &AccountId, action: &'static str) -> Result<(), ApprovalError> {
        match self.config.proposers {
            ProposerPolicy::Anyone => Ok(()),
            ProposerPolicy::Authorizers if self.registry.contains(proposer) => Ok(()),
            ProposerPolicy::Authorizers => Err(ApprovalError::unauthorized(proposer, action)),
        }
    }

    fn decide_sign<P: Pending>(
        &self,
        signer: &AccountId,
        id: TxId,
    ) -> Result<AccountEvent, ApprovalError> {
        let store = P::store(self);
        store.require(id)?;

        if !self.registry.contains(signer) {
            return Err(ApprovalError::unauthorized(signer, "sign transactions"));
        }
        let entry = store.check_signature(id, signer)?;

        // The new signer is a current authorizer, so it always qualifies
        if self.qualifying(entry) + 1 >= self.config.threshold() {
            P::executed_event(self, entry, signer.clone())
        } else {
            Ok(P::signed_event(id, signer.clone()))
        }
    }

    fn decide_delete<P: Pending>(
        &self,
        caller: &AccountId,
        id: TxId,
    ) -> Result<AccountEvent, ApprovalError> {
        let entry = P::store(self).require(id)?;

        if !self
            .policy
            .can_delete(caller, &entry.proposer, &self.owner, &self.registry)
        {
            return Err(ApprovalError::unauthorized(caller, "delete transactions"));
        }

        Ok(P::deleted_event(id, caller.clone()))
    }

    // --- State transitions ---

    /// Fold a committed event into state
    pub fn apply(&mut self, event: &AccountEvent) -> Result<(), ApprovalError> {
        match event {
            AccountEvent::AccountOpened { .. } => {
                return Err(ApprovalError::Inconsistent(
                    "account is already open".to_string(),
                ));
            }
            AccountEvent::Deposited { amount, .. } => {
                self.ledger.credit(&self.account, *amount)?;
            }
            AccountEvent::AuthorizerAdded {
                authorizer, level, ..
            } => {
                self.registry.add(authorizer.clone(), *level)?;
            }
            AccountEvent::AuthorizerRemoved { authorizer, .. } => {
                self.registry.remove(authorizer)?;
                if self.config.revocation == RevocationPolicy::Recount {
                    let revoked = self.withdrawals.revoke_signer(authorizer)
                        + self.ownership_transfers.revoke_signer(authorizer);
                    if revoked > 0 {
                        tracing::debug!(
                            %authorizer,
                            revoked,
                            "Withdrew signatures of removed authorizer"
                        );
                    }
                }
            }
            AccountEvent::WithdrawalProposed {
                id,
                proposer,
                destination,
                amount,
                tag,
                proposed_at,
            } => {
                expect_next_id(self.withdrawals.next_id(), *id)?;
                self.withdrawals.propose(
                    proposer.clone(),
                    Withdrawal {
                        destination: destination.clone(),
                        amount: *amount,
                        tag: *tag,
                    },
                    *proposed_at,
                );
            }
            AccountEvent::WithdrawalSigned { id, signer } => {
                let threshold = self.config.threshold();
                self.withdrawals
                    .record_signature(*id, signer.clone(), threshold)?;
            }
            AccountEvent::WithdrawalExecuted {
                id,
                destination,
                amount,
                ..
            } => {
                self.withdrawals.require(*id)?;
                self.ledger.transfer(&self.account, destination, *amount)?;
                self.withdrawals.delete(*id)?;
            }
            AccountEvent::WithdrawalDeleted { id, .. } => {
                self.withdrawals.delete(*id)?;
            }
            AccountEvent::OwnershipTransferProposed {
                id,
                proposer,
                new_owner,
                proposed_at,
            } => {
                expect_next_id(self.ownership_transfers.next_id(), *id)?;
                self.ownership_transfers.propose(
                    proposer.clone(),
                    OwnershipTransfer {
                        new_owner: new_owner.clone(),
                    },
                    *proposed_at,
                );
            }
            AccountEvent::OwnershipTransferSigned { id, signer } => {
                let threshold = self.config.threshold();
                self.ownership_transfers
                    .record_signature(*id, signer.clone(), threshold)?;
            }
            AccountEvent::OwnershipTransferred { id, new_owner, .. } => {
                self.ownership_transfers.delete(*id)?;
                self.owner = new_owner.clone();
            }
            AccountEvent::OwnershipTransferDeleted { id, .. } => {
                self.ownership_transfers.delete(*id)?;
            }
        }
        Ok(())
    }
}

fn expect_next_id(expected: TxId, found: TxId) -> Result<(), ApprovalError> {
    if expected != found {
        return Err(ApprovalError::Inconsistent(format!(
            "expected proposal {}, found {}",
            expected, found
        )));
    }
    Ok(())
}
