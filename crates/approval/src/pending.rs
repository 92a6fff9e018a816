//! Pending transaction data structures

use chrono::{DateTime, Utc};
use coffer_core::{AccountId, Amount, TxId};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};

/// Where a pending transaction stands; executed or deleted entries leave the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Recorded, no signatures yet
    Proposed,
    /// Some signatures, threshold not reached
    PartiallySigned,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Proposed => "proposed",
            TransactionStatus::PartiallySigned => "partially_signed",
        }
    }
}

/// The two independent numbering spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Withdrawal,
    OwnershipTransfer,
}

/// What a pending transaction will do once approved
pub trait Payload: Clone + fmt::Debug + Send + 'static {
    const KIND: TransactionKind;

    /// The account that gains from execution; it may not approve it
    fn beneficiary(&self) -> &AccountId;
}

/// Outgoing funds from the checking account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub destination: AccountId,
    pub amount: Amount,

    /// Opaque caller-supplied reference (memo / nonce)
    pub tag: u64,
}

impl Payload for Withdrawal {
    const KIND: TransactionKind = TransactionKind::Withdrawal;

    fn beneficiary(&self) -> &AccountId {
        &self.destination
    }
}

/// Reassignment of the account owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransfer {
    pub new_owner: AccountId,
}

impl Payload for OwnershipTransfer {
    const KIND: TransactionKind = TransactionKind::OwnershipTransfer;

    fn beneficiary(&self) -> &AccountId {
        &self.new_owner
    }
}

/// A proposal awaiting co-signatures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction<P> {
    pub id: TxId,
    pub proposer: AccountId,
    pub payload: P,

    /// Signers in signing order, never repeated
    pub signers: Vec<AccountId>,

    pub proposed_at: DateTime<Utc>,
}

impl<P: Payload> PendingTransaction<P> {
    pub fn new(id: TxId, proposer: AccountId, payload: P, proposed_at: DateTime<Utc>) -> Self {
        Self {
            id,
            proposer,
            payload,
            signers: Vec::new(),
            proposed_at,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        P::KIND
    }

    pub fn status(&self) -> TransactionStatus {
        if self.signers.is_empty() {
            TransactionStatus::Proposed
        } else {
            TransactionStatus::PartiallySigned
        }
    }

    pub fn has_signed(&self, account: &AccountId) -> bool {
        self.signers.iter().any(|s| s == account)
    }

    pub fn signature_count(&self) -> usize {
        self.signers.len()
    }
}
