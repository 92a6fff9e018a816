//! Application context - wires the journal, config and account together

use anyhow::Context;
use coffer_approval::{AccountBuilder, ApprovalConfig, CheckingAccount};
use coffer_core::AccountId;
use coffer_events::{EventReader, EventStore, LogSubscriber};
use coffer_ledger::InMemoryLedger;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Config file looked up in the data directory when none is given
pub const CONFIG_FILE: &str = "coffer.json";

/// Application context
pub struct AppContext {
    config: ApprovalConfig,
    account: Option<CheckingAccount<InMemoryLedger>>,
    journal_path: PathBuf,
}

impl AppContext {
    /// Load config and replay the journal under `data_path`
    pub fn new(data_path: impl AsRef<Path>, config_path: Option<&Path>) -> anyhow::Result<Self> {
        let data_path = data_path.as_ref();
        let journal_path = data_path.join("journal");
        std::fs::create_dir_all(&journal_path)?;

        let config = load_config(data_path, config_path)?;
        config.validate()?;

        let records = EventReader::from_directory(&journal_path)?.read_all()?;
        let account = if records.is_empty() {
            None
        } else {
            let account = AccountBuilder::new(config.clone(), InMemoryLedger::new())
                .journal(EventStore::open(&journal_path)?)
                .subscriber(Arc::new(LogSubscriber))
                .restore(&records)
                .context("Failed to replay journal")?;
            Some(account)
        };

        tracing::debug!(
            journal = %journal_path.display(),
            records = records.len(),
            "Context loaded"
        );

        Ok(Self {
            config,
            account,
            journal_path,
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.account.is_some()
    }

    /// Open the account, journaling its first record
    pub fn init(&mut self, creator: AccountId) -> anyhow::Result<&CheckingAccount<InMemoryLedger>> {
        if self.account.is_some() {
            anyhow::bail!("Account already initialized");
        }

        let account = AccountBuilder::new(self.config.clone(), InMemoryLedger::new())
            .journal(EventStore::open(&self.journal_path)?)
            .subscriber(Arc::new(LogSubscriber))
            .open(creator)?;

        Ok(&*self.account.insert(account))
    }

    /// The account, or an error telling the user to run `init`
    pub fn account(&self) -> anyhow::Result<&CheckingAccount<InMemoryLedger>> {
        self.account
            .as_ref()
            .context("Account not initialized (run `coffer init <creator>` first)")
    }

    pub fn config(&self) -> &ApprovalConfig {
        &self.config
    }

    pub fn journal_path(&self) -> &Path {
        &self.journal_path
    }
}

/// Explicit path, then `<data>/coffer.json`, then defaults
fn load_config(data_path: &Path, explicit: Option<&Path>) -> anyhow::Result<ApprovalConfig> {
    if let Some(path) = explicit {
        return ApprovalConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let fallback = data_path.join(CONFIG_FILE);
    if fallback.exists() {
        return ApprovalConfig::from_file(&fallback)
            .with_context(|| format!("Failed to load config from {}", fallback.display()));
    }

    Ok(ApprovalConfig::default())
}
