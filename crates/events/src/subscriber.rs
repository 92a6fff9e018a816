//! Event subscribers
//!
//! Subscribers are notified synchronously, in commit order, after an event
//! has been applied. A failing subscriber is logged and skipped; it never
//! rolls back the operation that produced the event.

use crate::error::EventError;
use crate::event::AccountEvent;

/// Receives committed account events
///
/// `handle` runs while the account lock is held. It must not call back into
/// the account that emitted the event (queries included) or it deadlocks;
/// forward the event elsewhere and read the account after the operation
/// returns.
pub trait EventSubscriber: Send + Sync {
    /// Subscriber name (for logging)
    fn name(&self) -> &str;

    /// Handle one committed event, under the account lock
    fn handle(&self, event: &AccountEvent) -> Result<(), EventError>;
}

/// Logs every event through `tracing`
#[derive(Debug, Default)]
pub struct LogSubscriber;

impl EventSubscriber for LogSubscriber {
    fn name(&self) -> &str {
        "log"
    }

    fn handle(&self, event: &AccountEvent) -> Result<(), EventError> {
        match event {
            AccountEvent::WithdrawalExecuted {
                id,
                destination,
                amount,
                ..
            } => tracing::info!(%id, %destination, %amount, "Withdrawal executed"),
            AccountEvent::OwnershipTransferred {
                id,
                previous_owner,
                new_owner,
                ..
            } => tracing::info!(%id, %previous_owner, %new_owner, "Ownership transferred"),
            other => tracing::info!(kind = other.kind(), actor = %other.actor(), "Account event"),
        }
        Ok(())
    }
}
