//! Journal records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::AccountEvent;
use crate::hash::{calculate_record_hash, GENESIS_HASH};

/// One line of the journal: an event plus its place in the hash chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    /// Strictly increasing, starting at 1
    pub sequence: u64,

    /// Hash of the previous record, or `GENESIS` for the first one
    pub prev_hash: String,

    /// SHA256 over every other field
    pub hash: String,

    pub timestamp: DateTime<Utc>,

    pub event: AccountEvent,
}

impl JournalRecord {
    /// Seal an event onto the chain after `prev` (None for the first record)
    pub fn seal(
        prev: Option<&JournalRecord>,
        event: AccountEvent,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        let (sequence, prev_hash) = match prev {
            Some(prev) => (prev.sequence + 1, prev.hash.clone()),
            None => (1, GENESIS_HASH.to_string()),
        };

        let mut record = Self {
            sequence,
            prev_hash,
            hash: String::new(),
            timestamp,
            event,
        };
        record.hash = calculate_record_hash(&record)?;
        Ok(record)
    }

    pub fn is_genesis(&self) -> bool {
        self.sequence == 1 && self.prev_hash == GENESIS_HASH
    }
}
