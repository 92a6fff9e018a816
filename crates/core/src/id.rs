//! Pending transaction identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sequential identifier within one numbering space.
///
/// Withdrawals and ownership transfers each count from `#0` independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(pub u64);

impl TxId {
    pub const FIRST: Self = Self(0);

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for TxId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for TxId {
    type Err = std::num::ParseIntError;

    /// Accepts both `3` and `#3`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(Self)
    }
}
