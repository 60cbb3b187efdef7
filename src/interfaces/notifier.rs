//! Outbound user notifications.

use async_trait::async_trait;

use crate::domain::AccountId;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Sends a text message to a user.
///
/// Best effort: a failed delivery never rolls back the ledger change that
/// prompted it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, id: AccountId, message: &str) -> Result<(), NotifyError>;
}
