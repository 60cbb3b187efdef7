use crate::domain::{AccountId, Amount};
use crate::storage::StorageError;

/// Result type for reward operations.
pub type Result<T> = std::result::Result<T, RewardError>;

/// Coarse classification callers use to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The account does not exist.
    NotFound,
    /// The store could not be reached in time; retry later.
    Unavailable,
    /// The request was understood and refused.
    Declined,
    /// Anything else.
    Internal,
}

/// Errors surfaced by the reward engine.
#[derive(Debug, thiserror::Error)]
pub enum RewardError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Insufficient funds: account={id}, balance={balance}")]
    InsufficientFunds { id: AccountId, balance: Amount },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store error: {0}")]
    Store(StorageError),
}

impl RewardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RewardError::AccountNotFound(_) => ErrorCategory::NotFound,
            RewardError::InsufficientFunds { .. } => ErrorCategory::Declined,
            RewardError::StoreUnavailable(_) => ErrorCategory::Unavailable,
            RewardError::Store(_) => ErrorCategory::Internal,
        }
    }
}

impl From<StorageError> for RewardError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::AccountNotFound(id) => RewardError::AccountNotFound(id),
            StorageError::InsufficientFunds { id, balance, .. } => {
                RewardError::InsufficientFunds { id, balance }
            }
            StorageError::Unavailable(reason) => RewardError::StoreUnavailable(reason),
            // Exhausted swap retries: the account is too hot to settle right now.
            StorageError::Contention(id) => {
                RewardError::StoreUnavailable(format!("contention on account {}", id))
            }
            other => RewardError::Store(other),
        }
    }
}
