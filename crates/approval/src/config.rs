//! Approval policy configuration
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Defaults reproduce a single co-signer account with up to ten
//! authorizers.

use std::sync::Arc;

use coffer_authorizers::{AccessPolicy, AuthorizersOrOwner, OwnerOnly, DEFAULT_CAPACITY};
use serde::{Deserialize, Serialize};

use crate::error::ApprovalError;

/// Configuration for a checking account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalConfig {
    /// Distinct non-proposer signatures needed to execute
    #[serde(default = "default_required_signatures")]
    pub required_signatures: u8,

    /// Maximum authorizers, creator included
    #[serde(default = "default_max_authorizers")]
    pub max_authorizers: usize,

    /// Level recorded for the creator when the account is opened
    #[serde(default = "default_creator_level")]
    pub creator_level: u32,

    #[serde(default)]
    pub revocation: RevocationPolicy,

    #[serde(default)]
    pub proposers: ProposerPolicy,

    #[serde(default)]
    pub administration: AdminPolicyKind,
}

/// What happens to signatures of an authorizer who is later removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RevocationPolicy {
    /// Signatures already cast keep counting
    #[default]
    Freeze,

    /// Only signatures from current authorizers count toward the threshold
    Recount,
}

/// Who may open a pending transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProposerPolicy {
    #[default]
    Anyone,
    Authorizers,
}

/// Built-in access policies selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdminPolicyKind {
    #[default]
    AuthorizersOrOwner,
    OwnerOnly,
}

impl AdminPolicyKind {
    pub fn build(&self) -> Arc<dyn AccessPolicy> {
        match self {
            AdminPolicyKind::AuthorizersOrOwner => Arc::new(AuthorizersOrOwner),
            AdminPolicyKind::OwnerOnly => Arc::new(OwnerOnly),
        }
    }
}

fn default_required_signatures() -> u8 {
    1
}

fn default_max_authorizers() -> usize {
    DEFAULT_CAPACITY
}

fn default_creator_level() -> u32 {
    1
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            required_signatures: default_required_signatures(),
            max_authorizers: default_max_authorizers(),
            creator_level: default_creator_level(),
            revocation: RevocationPolicy::default(),
            proposers: ProposerPolicy::default(),
            administration: AdminPolicyKind::default(),
        }
    }
}

impl ApprovalConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    pub fn with_required_signatures(mut self, required: u8) -> Self {
        self.required_signatures = required;
        self
    }

    pub fn with_revocation(mut self, revocation: RevocationPolicy) -> Self {
        self.revocation = revocation;
        self
    }

    pub fn with_proposers(mut self, proposers: ProposerPolicy) -> Self {
        self.proposers = proposers;
        self
    }

    pub fn with_administration(mut self, administration: AdminPolicyKind) -> Self {
        self.administration = administration;
        self
    }

    /// Reject settings under which no transaction could ever execute
    pub fn validate(&self) -> Result<(), ApprovalError> {
        if self.max_authorizers == 0 {
            return Err(ApprovalError::Config(
                "max_authorizers must be at least 1".to_string(),
            ));
        }
        if self.required_signatures == 0 {
            return Err(ApprovalError::Config(
                "required_signatures must be at least 1".to_string(),
            ));
        }
        if usize::from(self.required_signatures) > self.max_authorizers {
            return Err(ApprovalError::Config(format!(
                "required_signatures ({}) exceeds max_authorizers ({})",
                self.required_signatures, self.max_authorizers
            )));
        }
        Ok(())
    }

    pub fn threshold(&self) -> usize {
        usize::from(self.required_signatures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApprovalConfig::default();

        assert_eq!(config.required_signatures, 1);
        assert_eq!(config.max_authorizers, 10);
        assert_eq!(config.creator_level, 1);
        assert_eq!(config.revocation, RevocationPolicy::Freeze);
        assert_eq!(config.proposers, ProposerPolicy::Anyone);
        assert_eq!(config.administration, AdminPolicyKind::AuthorizersOrOwner);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_partial_json() {
        let json = r#"{ "required_signatures": 2, "revocation": "recount" }"#;
        let config: ApprovalConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.required_signatures, 2);
        assert_eq!(config.revocation, RevocationPolicy::Recount);
        assert_eq!(config.max_authorizers, 10); // default
    }

    #[test]
    fn test_config_serialization() {
        let config = ApprovalConfig::default().with_administration(AdminPolicyKind::OwnerOnly);
        let json = serde_json::to_string_pretty(&config).unwrap();

        assert!(json.contains("owner_only"));
        assert!(json.contains("freeze"));

        let parsed: ApprovalConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validation() {
        let zero = ApprovalConfig::default().with_required_signatures(0);
        assert!(matches!(zero.validate(), Err(ApprovalError::Config(_))));

        let unreachable = ApprovalConfig {
            max_authorizers: 2,
            ..ApprovalConfig::default().with_required_signatures(3)
        };
        assert!(matches!(unreachable.validate(), Err(ApprovalError::Config(_))));

        let empty = ApprovalConfig {
            max_authorizers: 0,
            ..ApprovalConfig::default()
        };
        assert!(matches!(empty.validate(), Err(ApprovalError::Config(_))));
    }

    #[test]
    fn test_policy_kind_builds_matching_policy() {
        assert_eq!(AdminPolicyKind::OwnerOnly.build().name(), "owner_only");
        assert_eq!(
            AdminPolicyKind::AuthorizersOrOwner.build().name(),
            "authorizers_or_owner"
        );
    }
}
