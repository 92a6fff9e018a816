//! Coffer Core - Domain types
//!
//! This crate contains the fundamental types used across Coffer:
//! - `AccountId`: Normalized identifier of a ledger participant
//! - `Amount`: Non-negative decimal wrapper for financial amounts
//! - `TxId`: Sequential identifier of a pending transaction

pub mod account;
pub mod amount;
pub mod id;

pub use account::{AccountId, AccountIdError};
pub use amount::{Amount, AmountError};
pub use id::TxId;
