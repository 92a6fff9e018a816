//! Coffer CLI - Main entry point

use coffer_core::{AccountId, Amount, TxId};
use coffer_rpc::{commands, AppContext};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coffer")]
#[command(about = "Coffer - multi-signature checking account", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data")]
    data: PathBuf,

    /// Approval config file (defaults to <data>/coffer.json)
    #[arg(short, long, env = "COFFER_CONFIG")]
    config: Option<PathBuf>,

    /// Account issuing the command
    #[arg(long = "as", value_name = "ACCOUNT", env = "COFFER_CALLER")]
    caller: Option<AccountId>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the checking account
    Init {
        /// Owner and first authorizer
        creator: AccountId,
    },

    /// Deposit funds (no approval needed)
    Deposit {
        amount: Amount,
    },

    /// Grant co-signing rights
    AddAuthorizer {
        account: AccountId,
        #[arg(long, default_value = "1")]
        level: u32,
    },

    /// Revoke co-signing rights
    RemoveAuthorizer {
        account: AccountId,
    },

    /// Propose a withdrawal
    Withdraw {
        destination: AccountId,
        amount: Amount,
        /// Caller reference stored with the proposal
        #[arg(long, default_value = "0")]
        tag: u64,
    },

    /// Sign a pending withdrawal
    SignWithdrawal {
        id: TxId,
    },

    /// Delete a pending withdrawal
    DeleteWithdrawal {
        id: TxId,
    },

    /// Propose an ownership transfer
    TransferOwnership {
        new_owner: AccountId,
    },

    /// Sign a pending ownership transfer
    SignOwnership {
        id: TxId,
    },

    /// Delete a pending ownership transfer
    DeleteOwnership {
        id: TxId,
    },

    /// Show account state
    Status,

    /// List pending transactions
    Pending,

    /// Verify the journal hash chain
    Audit,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let mut ctx = AppContext::new(&cli.data, cli.config.as_deref())?;

    let caller = || {
        cli.caller
            .clone()
            .ok_or_else(|| anyhow::anyhow!("This command needs --as <ACCOUNT>"))
    };

    match cli.command {
        Commands::Init { ref creator } => commands::init(&mut ctx, creator)?,
        Commands::Deposit { amount } => {
            // Anonymous deposits are credited from EXTERNAL
            let from = match &cli.caller {
                Some(caller) => caller.clone(),
                None => AccountId::new("external")?,
            };
            commands::deposit(&ctx, &from, amount)?;
        }
        Commands::AddAuthorizer { ref account, level } => {
            commands::add_authorizer(&ctx, &caller()?, account, level)?
        }
        Commands::RemoveAuthorizer { ref account } => {
            commands::remove_authorizer(&ctx, &caller()?, account)?
        }
        Commands::Withdraw {
            ref destination,
            amount,
            tag,
        } => commands::withdraw(&ctx, &caller()?, destination, amount, tag)?,
        Commands::SignWithdrawal { id } => commands::sign_withdrawal(&ctx, &caller()?, id)?,
        Commands::DeleteWithdrawal { id } => commands::delete_withdrawal(&ctx, &caller()?, id)?,
        Commands::TransferOwnership { ref new_owner } => {
            commands::transfer_ownership(&ctx, &caller()?, new_owner)?
        }
        Commands::SignOwnership { id } => commands::sign_ownership(&ctx, &caller()?, id)?,
        Commands::DeleteOwnership { id } => commands::delete_ownership(&ctx, &caller()?, id)?,
        Commands::Status => commands::status(&ctx)?,
        Commands::Pending => commands::pending(&ctx)?,
        Commands::Audit => commands::audit(&ctx)?,
    }

    Ok(())
}
