use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{AccountId, Amount};

/// Result of [`RewardEngine::onboard`](super::RewardEngine::onboard).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnboardOutcome {
    /// True only for the call that created the account.
    pub is_new: bool,
    /// The referrer that received the referral reward, if any.
    pub credited_referrer: Option<AccountId>,
}

impl OnboardOutcome {
    pub(crate) fn existing() -> Self {
        Self {
            is_new: false,
            credited_referrer: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BonusOutcome {
    Granted { amount: Amount, balance: Amount },
    Cooling { next_eligible_at: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WithdrawOutcome {
    /// The balance was cleared; `amount` is what it held.
    Approved { amount: Amount },
    /// Nothing changed.
    Declined { balance: Amount, threshold: Amount },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub balance: Amount,
    pub referral_count: usize,
}
