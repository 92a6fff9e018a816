//! Account events

use chrono::{DateTime, Utc};
use coffer_core::{AccountId, Amount, TxId};
use serde::{Deserialize, Serialize};
use strum_macros::IntoStaticStr;

/// A committed state change of a checking account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AccountEvent {
    /// The account was created; `owner` is also its first authorizer
    AccountOpened {
        account: AccountId,
        owner: AccountId,
        level: u32,
    },

    /// Value was received (no authorization gate)
    Deposited { from: AccountId, amount: Amount },

    AuthorizerAdded {
        by: AccountId,
        authorizer: AccountId,
        level: u32,
    },

    AuthorizerRemoved {
        by: AccountId,
        authorizer: AccountId,
    },

    WithdrawalProposed {
        id: TxId,
        proposer: AccountId,
        destination: AccountId,
        amount: Amount,
        tag: u64,
        proposed_at: DateTime<Utc>,
    },

    /// A signature that did not reach the threshold
    WithdrawalSigned { id: TxId, signer: AccountId },

    /// The final signature: funds moved and the entry left the pending set
    WithdrawalExecuted {
        id: TxId,
        signer: AccountId,
        destination: AccountId,
        amount: Amount,
    },

    WithdrawalDeleted { id: TxId, by: AccountId },

    OwnershipTransferProposed {
        id: TxId,
        proposer: AccountId,
        new_owner: AccountId,
        proposed_at: DateTime<Utc>,
    },

    OwnershipTransferSigned { id: TxId, signer: AccountId },

    /// The final signature: the owner changed and the entry left the pending set
    OwnershipTransferred {
        id: TxId,
        signer: AccountId,
        previous_owner: AccountId,
        new_owner: AccountId,
    },

    OwnershipTransferDeleted { id: TxId, by: AccountId },
}

impl AccountEvent {
    /// Short snake_case name, e.g. `withdrawal_executed`
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// The account that caused this event
    pub fn actor(&self) -> &AccountId {
        match self {
            AccountEvent::AccountOpened { owner, .. } => owner,
            AccountEvent::Deposited { from, .. } => from,
            AccountEvent::AuthorizerAdded { by, .. }
            | AccountEvent::AuthorizerRemoved { by, .. }
            | AccountEvent::WithdrawalDeleted { by, .. }
            | AccountEvent::OwnershipTransferDeleted { by, .. } => by,
            AccountEvent::WithdrawalProposed { proposer, .. }
            | AccountEvent::OwnershipTransferProposed { proposer, .. } => proposer,
            AccountEvent::WithdrawalSigned { signer, .. }
            | AccountEvent::WithdrawalExecuted { signer, .. }
            | AccountEvent::OwnershipTransferSigned { signer, .. }
            | AccountEvent::OwnershipTransferred { signer, .. } => signer,
        }
    }

    /// Pending transaction this event refers to, if any
    pub fn transaction_id(&self) -> Option<TxId> {
        match self {
            AccountEvent::AccountOpened { .. }
            | AccountEvent::Deposited { .. }
            | AccountEvent::AuthorizerAdded { .. }
            | AccountEvent::AuthorizerRemoved { .. } => None,
            AccountEvent::WithdrawalProposed { id, .. }
            | AccountEvent::WithdrawalSigned { id, .. }
            | AccountEvent::WithdrawalExecuted { id, .. }
            | AccountEvent::WithdrawalDeleted { id, .. }
            | AccountEvent::OwnershipTransferProposed { id, .. }
            | AccountEvent::OwnershipTransferSigned { id, .. }
            | AccountEvent::OwnershipTransferred { id, .. }
            | AccountEvent::OwnershipTransferDeleted { id, .. } => Some(*id),
        }
    }

    /// Whether this event finalized a pending transaction
    pub fn is_execution(&self) -> bool {
        matches!(
            self,
            AccountEvent::WithdrawalExecuted { .. } | AccountEvent::OwnershipTransferred { .. }
        )
    }
}
