//! AccountId - Identifier of anything that can hold or move value
//!
//! Checking accounts, their authorizers and external payees all share the
//! same identifier space. Identifiers are trimmed and upper-cased so that
//! `alice` and `ALICE` refer to the same participant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Account id cannot be empty")]
    Empty,

    #[error("Account id contains whitespace: {0}")]
    Whitespace(String),
}

/// Normalized account identifier
///
/// # Examples
/// ```
/// use coffer_core::AccountId;
///
/// let alice: AccountId = " alice ".parse().unwrap();
/// assert_eq!(alice.as_str(), "ALICE");
///
/// let vault = AccountId::generate("CHK");
/// assert!(vault.as_str().starts_with("CHK-"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, AccountIdError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(AccountIdError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(AccountIdError::Whitespace(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    /// Generate a fresh identifier such as `CHK-1A2B3C4D`
    pub fn generate(prefix: &str) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string()[..8].to_uppercase();
        Self(format!("{}-{}", prefix.trim().to_uppercase(), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountId {
    type Err = AccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = AccountIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
