//! Ledger storage interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Account, AccountId, Amount};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Insufficient funds: account={id}, balance={balance}, delta={delta}")]
    InsufficientFunds {
        id: AccountId,
        balance: Amount,
        delta: Amount,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Concurrent balance update kept conflicting: account={0}")]
    Contention(AccountId),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl StorageError {
    /// Transient failures a caller may retry later.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Unavailable(_) | StorageError::Contention(_))
    }
}

#[cfg(any(feature = "sqlite", feature = "postgres"))]
impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StorageError::Unavailable(e.to_string()),
            other => StorageError::Database(other),
        }
    }
}

/// Interface for ledger persistence.
///
/// Holds one [`Account`] per id and a set of referral edges keyed by the
/// referred account. Every operation is linearizable per account: balance
/// read-modify-write happens inside the store, never as a separate get
/// followed by a set.
///
/// # Implementations
///
/// - `SqliteLedgerStore`: SQLite storage
/// - `PostgresLedgerStore`: PostgreSQL storage
/// - `MockLedgerStore`: In-memory mock for testing
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fetch an account. `None` when the id is unknown.
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>>;

    /// Create the account unless it already exists.
    ///
    /// Returns the stored account and whether this call created it. A caller
    /// that loses a creation race gets `false` and the existing record; its
    /// `referred_by` is discarded, not merged.
    async fn create_account_if_absent(
        &self,
        id: AccountId,
        referred_by: Option<AccountId>,
    ) -> Result<(Account, bool)>;

    /// Add `delta` (possibly negative) to the balance and return the result.
    ///
    /// Fails with `AccountNotFound` for unknown ids and `InsufficientFunds`
    /// when the balance would drop below zero; nothing is written then.
    async fn adjust_balance(&self, id: AccountId, delta: Amount) -> Result<Amount>;

    /// Replace the balance with `value` while it is at least `floor`.
    ///
    /// Returns the replaced balance, or `None` (no write) when the current
    /// balance is below `floor`. A concurrent credit lands either entirely
    /// before the swap (and is included in the returned balance) or
    /// entirely after it.
    async fn set_balance(&self, id: AccountId, value: Amount, floor: Amount)
        -> Result<Option<Amount>>;

    /// Stamp the time of the latest successful bonus claim.
    async fn record_bonus_claim(&self, id: AccountId, at: DateTime<Utc>) -> Result<()>;

    /// Stamp `at` as the latest bonus claim only while `last_bonus_at` still
    /// equals `expected` (`None` meaning never claimed).
    ///
    /// Returns `false` without writing when another claim stamped first.
    /// Fails with `AccountNotFound` for unknown ids.
    async fn try_record_bonus_claim(
        &self,
        id: AccountId,
        expected: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    /// Record that `referred` joined through `referrer`.
    ///
    /// Returns `false` without writing when `referred` already has an edge,
    /// whichever referrer it names.
    async fn try_record_referral(&self, referrer: AccountId, referred: AccountId) -> Result<bool>;

    /// Accounts referred by `referrer`, in no particular order.
    async fn list_referrals(&self, referrer: AccountId) -> Result<Vec<AccountId>>;
}
