//! Reward rules over the ledger store.
//!
//! The engine is stateless: every decision is made from what the store
//! returns, and every read-modify-write happens inside a single store call.
//! Several engines may share one database.

mod error;
mod outcome;


pub use error::{ErrorCategory, Result, RewardError};
pub use outcome::{AccountSummary, BonusOutcome, OnboardOutcome, WithdrawOutcome};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::config::RewardsConfig;
use crate::domain::{Account, AccountId, Amount, ReferralToken};
use crate::storage::{self, LedgerStore};

/// Default upper bound for a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Account creation, referral crediting, bonus claims and withdrawals.
#[derive(Clone)]
pub struct RewardEngine {
    store: Arc<dyn LedgerStore>,
    rules: RewardsConfig,
    store_timeout: Duration,
}

impl RewardEngine {
    pub fn new(store: Arc<dyn LedgerStore>, rules: RewardsConfig) -> Self {
        Self {
            store,
            rules,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Bound every store call by `timeout`.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn rules(&self) -> &RewardsConfig {
        &self.rules
    }

    /// Await a store call, failing as unavailable past the timeout.
    async fn call<T>(&self, op: impl Future<Output = storage::Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.store_timeout, op).await {
            Ok(result) => result.map_err(RewardError::from),
            Err(_) => Err(RewardError::StoreUnavailable(format!(
                "store call exceeded {:?}",
                self.store_timeout
            ))),
        }
    }

    async fn require(&self, id: AccountId) -> Result<Account> {
        self.call(self.store.get_account(id))
            .await?
            .ok_or(RewardError::AccountNotFound(id))
    }

    /// Create the account on first contact, crediting a valid referrer once.
    ///
    /// Malformed tokens, self-referral and unknown referrers all mean
    /// "no referrer". Store failures propagate.
    #[tracing::instrument(name = "rewards.onboard", skip_all, fields(account = %id))]
    pub async fn onboard(
        &self,
        id: AccountId,
        referral_token: Option<&str>,
    ) -> Result<OnboardOutcome> {
        if self.call(self.store.get_account(id)).await?.is_some() {
            return Ok(OnboardOutcome::existing());
        }

        let referrer = match referral_token {
            Some(raw) => self.resolve_referrer(id, raw).await?,
            None => None,
        };

        let (_, created) = self
            .call(self.store.create_account_if_absent(id, referrer))
            .await?;
        if !created {
            debug!("Lost account creation race");
            return Ok(OnboardOutcome::existing());
        }
        info!(referrer = ?referrer, "New account created");

        let credited_referrer = match referrer {
            Some(referrer) => self.credit_referrer(referrer, id).await?,
            None => None,
        };

        Ok(OnboardOutcome {
            is_new: true,
            credited_referrer,
        })
    }

    async fn resolve_referrer(&self, id: AccountId, raw: &str) -> Result<Option<AccountId>> {
        let token = match ReferralToken::parse(raw) {
            Ok(token) => token,
            Err(e) => {
                debug!(error = %e, "Ignoring referral token");
                return Ok(None);
            }
        };

        let referrer = token.account_id();
        if referrer == id {
            debug!("Ignoring self-referral");
            return Ok(None);
        }

        if self.call(self.store.get_account(referrer)).await?.is_none() {
            debug!(referrer = %referrer, "Ignoring referral from unknown account");
            return Ok(None);
        }

        Ok(Some(referrer))
    }

    async fn credit_referrer(
        &self,
        referrer: AccountId,
        referred: AccountId,
    ) -> Result<Option<AccountId>> {
        if !self
            .call(self.store.try_record_referral(referrer, referred))
            .await?
        {
            warn!(referrer = %referrer, "Referral already recorded; not crediting");
            return Ok(None);
        }

        let reward = self.rules.referral_reward;
        let balance = match self.call(self.store.adjust_balance(referrer, reward)).await {
            Ok(balance) => balance,
            Err(e) => {
                // The edge is recorded, so no later onboard will retry this.
                error!(
                    error = %e,
                    referrer = %referrer,
                    referred = %referred,
                    reward = %reward,
                    "Referral recorded but reward not credited; credit manually"
                );
                return Err(e);
            }
        };
        info!(
            referrer = %referrer,
            reward = %reward,
            balance = %balance,
            "Referral reward credited"
        );

        Ok(Some(referrer))
    }

    /// Grant the recurring bonus if a full cooldown has elapsed since the
    /// last grant.
    ///
    /// The cooldown stamp is taken first, conditional on the stamp this call
    /// read, so of several concurrent claims only one is credited. The stamp
    /// and the credit are two writes; a crash between them leaves the stamp
    /// without the credit.
    #[tracing::instrument(name = "rewards.claim_bonus", skip_all, fields(account = %id))]
    pub async fn claim_bonus(&self, id: AccountId, now: DateTime<Utc>) -> Result<BonusOutcome> {
        let account = self.require(id).await?;
        let cooldown = self.rules.bonus_cooldown();

        if !account.bonus_eligible(now, cooldown) {
            if let Some(next_eligible_at) = account.next_bonus_at(cooldown) {
                debug!(next_eligible_at = %next_eligible_at, "Bonus cooling down");
                return Ok(BonusOutcome::Cooling { next_eligible_at });
            }
        }

        let stamped = self
            .call(self.store.try_record_bonus_claim(id, account.last_bonus_at, now))
            .await?;
        if !stamped {
            let next_eligible_at = self
                .require(id)
                .await?
                .next_bonus_at(cooldown)
                .unwrap_or(now + cooldown);
            debug!(next_eligible_at = %next_eligible_at, "Bonus claim lost race");
            return Ok(BonusOutcome::Cooling { next_eligible_at });
        }

        let amount = self.rules.bonus_amount;
        let balance = match self.call(self.store.adjust_balance(id, amount)).await {
            Ok(balance) => balance,
            Err(e) => {
                error!(
                    error = %e,
                    amount = %amount,
                    claimed_at = %now,
                    "Bonus stamped but not credited; credit manually"
                );
                return Err(e);
            }
        };
        info!(amount = %amount, balance = %balance, "Bonus granted");

        Ok(BonusOutcome::Granted { amount, balance })
    }

    /// Clear the whole balance once it reaches the withdrawal threshold.
    ///
    /// The check and the clear are one store operation, so a concurrent
    /// credit lands entirely before or entirely after it.
    #[tracing::instrument(name = "rewards.withdraw", skip_all, fields(account = %id))]
    pub async fn withdraw(&self, id: AccountId) -> Result<WithdrawOutcome> {
        let threshold = self.rules.withdraw_threshold;
        let account = self.require(id).await?;
        if !account.can_withdraw(threshold) {
            return Ok(WithdrawOutcome::Declined {
                balance: account.balance,
                threshold,
            });
        }

        match self
            .call(self.store.set_balance(id, Amount::ZERO, threshold))
            .await?
        {
            Some(amount) => {
                info!(amount = %amount, "Withdrawal approved");
                Ok(WithdrawOutcome::Approved { amount })
            }
            None => {
                // Another withdrawal cleared it first.
                let balance = self.require(id).await?.balance;
                debug!(balance = %balance, "Withdrawal lost race");
                Ok(WithdrawOutcome::Declined { balance, threshold })
            }
        }
    }

    #[tracing::instrument(name = "rewards.summary", skip_all, fields(account = %id))]
    pub async fn summary(&self, id: AccountId) -> Result<AccountSummary> {
        let account = self.require(id).await?;
        let referrals = self.call(self.store.list_referrals(id)).await?;

        Ok(AccountSummary {
            balance: account.balance,
            referral_count: referrals.len(),
        })
    }
}
