//! # Coffer Approval Module
//!
//! Multi-signature checking account: a bounded set of authorizers co-signs
//! withdrawals and ownership transfers proposed against the account.
//!
//! ## Flow
//! - Every operation is decided against current state and yields one event
//! - The event is journaled (when a journal is attached), then applied
//! - Subscribers are notified in commit order
//!
//! ## Features
//! - Configurable threshold (1 co-signer by default)
//! - Two independent pending sets with their own id sequences
//! - Swappable access policy for administration and deletion
//! - Replay from a hash-chained journal

mod account;
mod config;
mod engine;
mod error;
mod pending;
mod store;

pub use account::{AccountBuilder, CheckingAccount, SignOutcome};
pub use config::{AdminPolicyKind, ApprovalConfig, ProposerPolicy, RevocationPolicy};
pub use engine::{opening_event, ApprovalEngine};
pub use error::ApprovalError;
pub use pending::{
    OwnershipTransfer, Payload, PendingTransaction, TransactionKind, TransactionStatus,
    Withdrawal,
};
pub use store::{PendingStore, SignatureOutcome, StoreError};
