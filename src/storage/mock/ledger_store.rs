//! Mock LedgerStore implementation for testing.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::{Account, AccountId, Amount};
use crate::storage::{LedgerStore, Result, StorageError};

#[derive(Default)]
struct Ledger {
    accounts: HashMap<AccountId, Account>,
    /// referred -> referrer
    referrals: HashMap<AccountId, AccountId>,
}

/// Mock ledger store that keeps accounts in memory.
///
/// Every operation takes the single write lock, so operations are trivially
/// linearizable. Supports fault injection: an unavailable mode and a fixed
/// per-call latency.
#[derive(Default)]
pub struct MockLedgerStore {
    ledger: RwLock<Ledger>,
    unavailable: RwLock<bool>,
    latency: RwLock<Option<Duration>>,
}

impl MockLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StorageError::Unavailable`.
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.write().await = unavailable;
    }

    /// Delay every subsequent call by `latency`.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write().await = latency;
    }

    pub async fn account_count(&self) -> usize {
        self.ledger.read().await.accounts.len()
    }

    async fn check(&self) -> Result<()> {
        let latency = *self.latency.read().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if *self.unavailable.read().await {
            return Err(StorageError::Unavailable(
                "mock store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for MockLedgerStore {
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        self.check().await?;
        Ok(self.ledger.read().await.accounts.get(&id).cloned())
    }

    async fn create_account_if_absent(
        &self,
        id: AccountId,
        referred_by: Option<AccountId>,
    ) -> Result<(Account, bool)> {
        self.check().await?;
        let mut ledger = self.ledger.write().await;
        if let Some(existing) = ledger.accounts.get(&id) {
            return Ok((existing.clone(), false));
        }
        let account = Account::new(id, referred_by);
        ledger.accounts.insert(id, account.clone());
        Ok((account, true))
    }

    async fn adjust_balance(&self, id: AccountId, delta: Amount) -> Result<Amount> {
        self.check().await?;
        let mut ledger = self.ledger.write().await;
        let account = ledger
            .accounts
            .get_mut(&id)
            .ok_or(StorageError::AccountNotFound(id))?;

        let balance = account.balance;
        match balance.checked_add(delta) {
            Some(next) if !next.is_negative() => {
                account.balance = next;
                Ok(next)
            }
            _ => Err(StorageError::InsufficientFunds { id, balance, delta }),
        }
    }

    async fn set_balance(
        &self,
        id: AccountId,
        value: Amount,
        floor: Amount,
    ) -> Result<Option<Amount>> {
        self.check().await?;
        let mut ledger = self.ledger.write().await;
        let account = ledger
            .accounts
            .get_mut(&id)
            .ok_or(StorageError::AccountNotFound(id))?;

        let current = account.balance;
        if current < floor {
            return Ok(None);
        }
        if value.is_negative() {
            return Err(StorageError::InsufficientFunds {
                id,
                balance: current,
                delta: value - current,
            });
        }
        account.balance = value;
        Ok(Some(current))
    }

    async fn record_bonus_claim(&self, id: AccountId, at: DateTime<Utc>) -> Result<()> {
        self.check().await?;
        let mut ledger = self.ledger.write().await;
        let account = ledger
            .accounts
            .get_mut(&id)
            .ok_or(StorageError::AccountNotFound(id))?;
        account.last_bonus_at = Some(at);
        Ok(())
    }

    async fn try_record_bonus_claim(
        &self,
        id: AccountId,
        expected: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        self.check().await?;
        let mut ledger = self.ledger.write().await;
        let account = ledger
            .accounts
            .get_mut(&id)
            .ok_or(StorageError::AccountNotFound(id))?;

        if account.last_bonus_at != expected {
            return Ok(false);
        }
        account.last_bonus_at = Some(at);
        Ok(true)
    }

    async fn try_record_referral(&self, referrer: AccountId, referred: AccountId) -> Result<bool> {
        self.check().await?;
        if referrer == referred {
            return Ok(false);
        }
        let mut ledger = self.ledger.write().await;
        if ledger.referrals.contains_key(&referred) {
            return Ok(false);
        }
        ledger.referrals.insert(referred, referrer);
        Ok(true)
    }

    async fn list_referrals(&self, referrer: AccountId) -> Result<Vec<AccountId>> {
        self.check().await?;
        let ledger = self.ledger.read().await;
        let mut referred: Vec<AccountId> = ledger
            .referrals
            .iter()
            .filter(|(_, by)| **by == referrer)
            .map(|(id, _)| *id)
            .collect();
        referred.sort();
        Ok(referred)
    }
}
