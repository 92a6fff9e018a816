//! Coffer Events - Account notifications and journal
//!
//! Every state change of a checking account is described by exactly one
//! [`AccountEvent`]. Events are appended to a hash-chained JSONL journal,
//! which is the source of truth: in-memory state is rebuilt by replaying it.

pub mod error;
pub mod event;
pub mod hash;
pub mod reader;
pub mod record;
pub mod store;
pub mod subscriber;

pub use error::EventError;
pub use event::AccountEvent;
pub use hash::{calculate_record_hash, verify_chain, ChainError, GENESIS_HASH};
pub use reader::EventReader;
pub use record::JournalRecord;
pub use store::EventStore;
pub use subscriber::{EventSubscriber, LogSubscriber};
