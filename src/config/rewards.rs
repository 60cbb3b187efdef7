//! Reward rule configuration.

use chrono::Duration;
use serde::Deserialize;

use super::ConfigError;
use crate::domain::Amount;

/// Amounts are in minor units (100 per major unit).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RewardsConfig {
    /// Credited per successful recurring-bonus claim.
    pub bonus_amount: Amount,
    /// Credited to the referrer once per newly referred account.
    pub referral_reward: Amount,
    /// Minimum balance for an approved withdrawal.
    pub withdraw_threshold: Amount,
    /// Minimum interval between bonus grants, in seconds.
    pub bonus_cooldown_secs: u64,
    /// Symbol rendered in front of amounts in chat replies.
    pub currency_symbol: String,
}

impl RewardsConfig {
    pub fn bonus_cooldown(&self) -> Duration {
        Duration::seconds(self.bonus_cooldown_secs as i64)
    }

    /// Render an amount with the currency symbol, e.g. `₹5`.
    pub fn money(&self, amount: Amount) -> String {
        format!("{}{}", self.currency_symbol, amount)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("bonus_amount", self.bonus_amount),
            ("referral_reward", self.referral_reward),
            ("withdraw_threshold", self.withdraw_threshold),
        ];
        for (name, amount) in positive {
            if amount <= Amount::ZERO {
                return Err(ConfigError::Invalid(format!(
                    "rewards.{} must be positive",
                    name
                )));
            }
        }
        if self.bonus_cooldown_secs == 0 || self.bonus_cooldown_secs > i64::MAX as u64 / 1000 {
            return Err(ConfigError::Invalid(
                "rewards.bonus_cooldown_secs out of range".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            bonus_amount: Amount::from_major(1),
            referral_reward: Amount::from_major(5),
            withdraw_threshold: Amount::from_major(50),
            bonus_cooldown_secs: 24 * 60 * 60,
            currency_symbol: "₹".to_string(),
        }
    }
}
