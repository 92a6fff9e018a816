//! In-memory storage for one kind of pending transaction

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use coffer_core::{AccountId, TxId};
use thiserror::Error;

use crate::pending::{Payload, PendingTransaction, TransactionKind};

/// Errors from a pending store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
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
}

/// Result of recording a signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureOutcome {
    /// Signatures on the entry after this one was added
    pub signatures: usize,
    pub threshold_met: bool,
}

/// Pending transactions of one kind, with their own id sequence
#[derive(Debug, Clone)]
pub struct PendingStore<P: Payload> {
    entries: BTreeMap<TxId, PendingTransaction<P>>,
    next_id: TxId,
}

impl<P: Payload> Default for PendingStore<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Payload> PendingStore<P> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: TxId::FIRST,
        }
    }

    /// The id the next proposal will receive
    pub fn next_id(&self) -> TxId {
        self.next_id
    }

    /// Record a new proposal with no signatures
    pub fn propose(
        &mut self,
        proposer: AccountId,
        payload: P,
        proposed_at: DateTime<Utc>,
    ) -> TxId {
        let id = self.next_id;
        self.entries
            .insert(id, PendingTransaction::new(id, proposer, payload, proposed_at));
        self.next_id = id.next();
        id
    }

    pub fn get(&self, id: TxId) -> Option<&PendingTransaction<P>> {
        self.entries.get(&id)
    }

    /// Like `get`, but a missing entry is an error
    pub fn require(&self, id: TxId) -> Result<&PendingTransaction<P>, StoreError> {
        self.entries
            .get(&id)
            .ok_or(StoreError::NotFound { kind: P::KIND, id })
    }

    /// Validate that `signer` may add a signature, without recording it
    pub fn check_signature(
        &self,
        id: TxId,
        signer: &AccountId,
    ) -> Result<&PendingTransaction<P>, StoreError> {
        let entry = self.require(id)?;

        if &entry.proposer == signer {
            return Err(StoreError::SelfApproval { kind: P::KIND, id });
        }
        if entry.payload.beneficiary() == signer {
            return Err(StoreError::BeneficiaryApproval { kind: P::KIND, id });
        }
        if entry.has_signed(signer) {
            return Err(StoreError::AlreadySigned {
                kind: P::KIND,
                id,
                signer: signer.clone(),
            });
        }

        Ok(entry)
    }

    /// Add a signature and report whether `threshold` signatures are now present
    pub fn record_signature(
        &mut self,
        id: TxId,
        signer: AccountId,
        threshold: usize,
    ) -> Result<SignatureOutcome, StoreError> {
        self.check_signature(id, &signer)?;

        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(StoreError::NotFound { kind: P::KIND, id })?;
        entry.signers.push(signer);

        let signatures = entry.signers.len();
        Ok(SignatureOutcome {
            signatures,
            threshold_met: signatures >= threshold,
        })
    }

    /// Withdraw `signer`'s signature from every entry; returns how many were removed
    pub fn revoke_signer(&mut self, signer: &AccountId) -> usize {
        let mut removed = 0;
        for entry in self.entries.values_mut() {
            let before = entry.signers.len();
            entry.signers.retain(|s| s != signer);
            removed += before - entry.signers.len();
        }
        removed
    }

    /// Remove an entry (deleted or executed)
    pub fn delete(&mut self, id: TxId) -> Result<PendingTransaction<P>, StoreError> {
        self.entries
            .remove(&id)
            .ok_or(StoreError::NotFound { kind: P::KIND, id })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in id order
    pub fn iter(&self) -> impl Iterator<Item = &PendingTransaction<P>> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pending::{OwnershipTransfer, TransactionStatus, Withdrawal};
    use coffer_core::Amount;

    fn id(s: &str) -> AccountId {
        s.parse().unwrap()
    }

    fn withdrawal_to(destination: &str) -> Withdrawal {
        Withdrawal {
            destination: id(destination),
            amount: Amount::from_units(10),
            tag: 123,
        }
    }

    #[test]
    fn test_sequential_ids_from_zero() {
        let mut store = PendingStore::new();
        let first = store.propose(id("creator"), withdrawal_to("external"), Utc::now());
        let second = store.propose(id("creator"), withdrawal_to("external"), Utc::now());

        assert_eq!(first, TxId(0));
        assert_eq!(second, TxId(1));
        assert_eq!(store.next_id(), TxId(2));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(first).unwrap().status(), TransactionStatus::Proposed);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let mut store = PendingStore::new();
        let first = store.propose(id("creator"), withdrawal_to("external"), Utc::now());
        store.delete(first).unwrap();

        let second = store.propose(id("creator"), withdrawal_to("external"), Utc::now());
        assert_eq!(second, TxId(1));
        assert!(store.get(first).is_none());
    }

    #[test]
    fn test_record_signature() {
        let mut store = PendingStore::new();
        let tx = store.propose(id("creator"), withdrawal_to("external"), Utc::now());

        let outcome = store.record_signature(tx, id("first"), 2).unwrap();
        assert_eq!(
            outcome,
            SignatureOutcome {
                signatures: 1,
                threshold_met: false
            }
        );

        let outcome = store.record_signature(tx, id("second"), 2).unwrap();
        assert!(outcome.threshold_met);
        assert_eq!(store.get(tx).unwrap().signers, vec![id("first"), id("second")]);
    }

    #[test]
    fn test_self_approval_rejected() {
        let mut store = PendingStore::new();
        let tx = store.propose(id("creator"), withdrawal_to("external"), Utc::now());

        let result = store.record_signature(tx, id("creator"), 1);
        assert_eq!(
            result,
            Err(StoreError::SelfApproval {
                kind: TransactionKind::Withdrawal,
                id: tx
            })
        );
        assert_eq!(store.get(tx).unwrap().signature_count(), 0);
    }

    #[test]
    fn test_double_signature_rejected() {
        let mut store = PendingStore::new();
        let tx = store.propose(id("creator"), withdrawal_to("external"), Utc::now());
        store.record_signature(tx, id("first"), 3).unwrap();

        let result = store.record_signature(tx, id("first"), 3);
        assert!(matches!(result, Err(StoreError::AlreadySigned { .. })));
        assert_eq!(store.get(tx).unwrap().signature_count(), 1);
    }

    #[test]
    fn test_beneficiary_rejected() {
        let mut store = PendingStore::new();
        let tx = store.propose(
            id("creator"),
            OwnershipTransfer {
                new_owner: id("first"),
            },
            Utc::now(),
        );

        let result = store.check_signature(tx, &id("first"));
        assert_eq!(
            result.unwrap_err(),
            StoreError::BeneficiaryApproval {
                kind: TransactionKind::OwnershipTransfer,
                id: tx
            }
        );
    }

    #[test]
    fn test_revoke_signer() {
        let mut store = PendingStore::new();
        let first = store.propose(id("creator"), withdrawal_to("external"), Utc::now());
        let second = store.propose(id("creator"), withdrawal_to("external"), Utc::now());
        store.record_signature(first, id("first"), 3).unwrap();
        store.record_signature(first, id("second"), 3).unwrap();
        store.record_signature(second, id("first"), 3).unwrap();

        assert_eq!(store.revoke_signer(&id("first")), 2);
        assert_eq!(store.get(first).unwrap().signers, vec![id("second")]);
        assert_eq!(store.get(second).unwrap().status(), TransactionStatus::Proposed);

        // The revoked signer may sign again
        store.record_signature(second, id("first"), 3).unwrap();
        assert_eq!(store.revoke_signer(&id("nobody")), 0);
    }

    #[test]
    fn test_unknown_id() {
        let mut store: PendingStore<Withdrawal> = PendingStore::new();
        assert!(matches!(
            store.delete(TxId(1)),
            Err(StoreError::NotFound { id: TxId(1), .. })
        ));
        assert!(matches!(
            store.record_signature(TxId(1), id("first"), 1),
            Err(StoreError::NotFound { .. })
        ));
        assert!(store.is_empty());
    }
}
