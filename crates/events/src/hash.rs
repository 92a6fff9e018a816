//! Hash chain utilities for journal integrity

use sha2::{Digest, Sha256};
use std::fmt;

use crate::record::JournalRecord;

/// `prev_hash` of the first record
pub const GENESIS_HASH: &str = "GENESIS";

/// Calculate SHA256 hash of record content (excluding the hash field itself)
pub fn calculate_record_hash(record: &JournalRecord) -> Result<String, serde_json::Error> {
    let mut hasher = Sha256::new();

    hasher.update(record.sequence.to_le_bytes());
    hasher.update(record.prev_hash.as_bytes());
    hasher.update(record.timestamp.to_rfc3339().as_bytes());

    // Struct fields serialize in declaration order, so this is stable
    let event = serde_json::to_string(&record.event)?;
    hasher.update(event.as_bytes());

    Ok(hex::encode(hasher.finalize()))
}

/// Verify hash chain integrity
pub fn verify_chain(records: &[JournalRecord]) -> Result<(), ChainError> {
    let mut prev: Option<&JournalRecord> = None;

    for record in records {
        let (expected_sequence, expected_prev) = match prev {
            Some(p) => (p.sequence + 1, p.hash.as_str()),
            None => (1, GENESIS_HASH),
        };

        if record.sequence != expected_sequence {
            return Err(ChainError::InvalidSequence {
                expected: expected_sequence,
                actual: record.sequence,
            });
        }

        if record.prev_hash != expected_prev {
            return Err(ChainError::BrokenLink {
                sequence: record.sequence,
                expected: expected_prev.to_string(),
                actual: record.prev_hash.clone(),
            });
        }

        let calculated =
            calculate_record_hash(record).map_err(|e| ChainError::Unhashable {
                sequence: record.sequence,
                reason: e.to_string(),
            })?;
        if record.hash != calculated {
            return Err(ChainError::InvalidHash {
                sequence: record.sequence,
                expected: calculated,
                actual: record.hash.clone(),
            });
        }

        prev = Some(record);
    }

    Ok(())
}

/// Errors in hash chain verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    BrokenLink {
        sequence: u64,
        expected: String,
        actual: String,
    },
    InvalidHash {
        sequence: u64,
        expected: String,
        actual: String,
    },
    InvalidSequence {
        expected: u64,
        actual: u64,
    },
    Unhashable {
        sequence: u64,
        reason: String,
    },
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::BrokenLink {
                sequence,
                expected,
                actual,
            } => write!(
                f,
                "Broken link at seq {}: expected prev_hash '{}', got '{}'",
                sequence, expected, actual
            ),
            ChainError::InvalidHash {
                sequence,
                expected,
                actual,
            } => write!(
                f,
                "Invalid hash at seq {}: expected '{}', got '{}'",
                sequence, expected, actual
            ),
            ChainError::InvalidSequence { expected, actual } => {
                write!(f, "Invalid sequence: expected {}, got {}", expected, actual)
            }
            ChainError::Unhashable { sequence, reason } => {
                write!(f, "Cannot hash seq {}: {}", sequence, reason)
            }
        }
    }
}

impl std::error::Error for ChainError {}
