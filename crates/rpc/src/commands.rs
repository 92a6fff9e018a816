//! CLI commands

use coffer_approval::{ApprovalConfig, SignOutcome};
use coffer_core::{AccountId, Amount, TxId};
use coffer_events::{verify_chain, AccountEvent, EventReader};

use crate::context::AppContext;

/// Open the checking account with `creator` as owner
pub fn init(ctx: &mut AppContext, creator: &AccountId) -> Result<(), anyhow::Error> {
    let account = ctx.init(creator.clone())?;

    println!(
        "✅ Opened checking account {} (owner: {})",
        account.account_id(),
        account.owner()
    );
    Ok(())
}

/// Receive funds from `from`
pub fn deposit(ctx: &AppContext, from: &AccountId, amount: Amount) -> Result<(), anyhow::Error> {
    let account = ctx.account()?;
    account.deposit(from, amount)?;

    println!(
        "✅ Deposited {} from {} (balance: {})",
        amount,
        from,
        account.balance()
    );
    Ok(())
}

pub fn add_authorizer(
    ctx: &AppContext,
    caller: &AccountId,
    candidate: &AccountId,
    level: u32,
) -> Result<(), anyhow::Error> {
    let account = ctx.account()?;
    account.add_authorizer(caller, candidate, level)?;

    println!(
        "✅ Added authorizer {} at level {} ({} total)",
        candidate,
        level,
        account.authorizer_count()
    );
    Ok(())
}

pub fn remove_authorizer(
    ctx: &AppContext,
    caller: &AccountId,
    target: &AccountId,
) -> Result<(), anyhow::Error> {
    let account = ctx.account()?;
    account.remove_authorizer(caller, target)?;

    println!(
        "✅ Removed authorizer {} ({} remaining)",
        target,
        account.authorizer_count()
    );
    Ok(())
}

/// Propose a withdrawal
pub fn withdraw(
    ctx: &AppContext,
    caller: &AccountId,
    destination: &AccountId,
    amount: Amount,
    tag: u64,
) -> Result<(), anyhow::Error> {
    let id = ctx
        .account()?
        .propose_withdrawal(caller, destination, amount, tag)?;

    println!(
        "✅ Proposed withdrawal {} of {} to {} (awaiting {} signature(s))",
        id,
        amount,
        destination,
        ctx.config().required_signatures
    );
    Ok(())
}

pub fn sign_withdrawal(ctx: &AppContext, caller: &AccountId, id: TxId) -> Result<(), anyhow::Error> {
    let outcome = ctx.account()?.sign_withdrawal(caller, id)?;
    print_sign_outcome("Withdrawal", id, caller, outcome);
    Ok(())
}

pub fn delete_withdrawal(ctx: &AppContext, caller: &AccountId, id: TxId) -> Result<(), anyhow::Error> {
    ctx.account()?.delete_withdrawal(caller, id)?;

    println!("✅ Deleted withdrawal {}", id);
    Ok(())
}

/// Propose an ownership transfer
pub fn transfer_ownership(
    ctx: &AppContext,
    caller: &AccountId,
    new_owner: &AccountId,
) -> Result<(), anyhow::Error> {
    let id = ctx
        .account()?
        .propose_ownership_transfer(caller, new_owner)?;

    println!("✅ Proposed ownership transfer {} to {}", id, new_owner);
    Ok(())
}

pub fn sign_ownership(ctx: &AppContext, caller: &AccountId, id: TxId) -> Result<(), anyhow::Error> {
    let outcome = ctx.account()?.sign_ownership_transfer(caller, id)?;
    print_sign_outcome("Ownership transfer", id, caller, outcome);
    Ok(())
}

pub fn delete_ownership(ctx: &AppContext, caller: &AccountId, id: TxId) -> Result<(), anyhow::Error> {
    ctx.account()?.delete_ownership_transfer(caller, id)?;

    println!("✅ Deleted ownership transfer {}", id);
    Ok(())
}

fn print_sign_outcome(label: &str, id: TxId, signer: &AccountId, outcome: SignOutcome) {
    match outcome {
        SignOutcome::Executed => println!("✅ {} {} executed (signed by {})", label, id, signer),
        SignOutcome::Pending {
            signatures,
            required,
        } => println!(
            "✅ {} {} signed by {} ({}/{} signatures)",
            label, id, signer, signatures, required
        ),
    }
}

/// Show account state
pub fn status(ctx: &AppContext) -> Result<(), anyhow::Error> {
    let account = ctx.account()?;
    let ApprovalConfig {
        required_signatures,
        max_authorizers,
        revocation,
        proposers,
        ..
    } = account.config();

    println!("Account:     {}", account.account_id());
    println!("Owner:       {}", account.owner());
    println!("Balance:     {}", account.balance());
    println!(
        "Threshold:   {} signature(s), revocation {:?}, proposers {:?}",
        required_signatures, revocation, proposers
    );
    println!(
        "Policy:      {}",
        account.inspect(|engine| engine.policy().name().to_string())
    );

    println!();
    println!(
        "Authorizers ({}/{}):",
        account.authorizer_count(),
        max_authorizers
    );
    for authorizer in account.authorizers() {
        println!("  {} (level {})", authorizer.account, authorizer.level);
    }

    let balances = account.inspect(|engine| engine.ledger().balances());
    if !balances.is_empty() {
        println!();
        println!("Ledger:");
        for (holder, amount) in balances {
            println!("  {:<24} {}", holder.as_str(), amount);
        }
    }
    Ok(())
}

/// List pending transactions
pub fn pending(ctx: &AppContext) -> Result<(), anyhow::Error> {
    let account = ctx.account()?;
    let withdrawals = account.pending_withdrawals();
    let transfers = account.pending_ownership_transfers();

    if withdrawals.is_empty() && transfers.is_empty() {
        println!("No pending transactions");
        return Ok(());
    }

    for tx in withdrawals {
        println!(
            "withdrawal {:<5} {} -> {} (tag {}) by {} [{}] signers: {}",
            tx.id.to_string(),
            tx.payload.amount,
            tx.payload.destination,
            tx.payload.tag,
            tx.proposer,
            tx.status().as_str(),
            join(&tx.signers)
        );
    }
    for tx in transfers {
        println!(
            "ownership  {:<5} -> {} by {} [{}] signers: {}",
            tx.id.to_string(),
            tx.payload.new_owner,
            tx.proposer,
            tx.status().as_str(),
            join(&tx.signers)
        );
    }
    Ok(())
}

fn join(accounts: &[AccountId]) -> String {
    if accounts.is_empty() {
        return "-".to_string();
    }
    accounts
        .iter()
        .map(AccountId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Verify the journal hash chain
pub fn audit(ctx: &AppContext) -> Result<(), anyhow::Error> {
    let records = EventReader::from_directory(ctx.journal_path())?.read_all()?;

    match verify_chain(&records) {
        Ok(()) => {
            println!("✅ Hash chain verified ({} records)", records.len());
        }
        Err(e) => {
            println!("❌ Hash chain broken: {}", e);
            return Ok(());
        }
    }

    let executions = records
        .iter()
        .filter(|record| record.event.is_execution())
        .count();
    let deposits = records
        .iter()
        .filter(|record| matches!(record.event, AccountEvent::Deposited { .. }))
        .count();
    println!("   {} deposit(s), {} execution(s)", deposits, executions);
    Ok(())
}
