//! Account record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Amount;

/// Externally supplied account identifier (the chat user id).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for AccountId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for AccountId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ledger record for one user.
///
/// `balance` never goes negative and `referred_by` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub balance: Amount,
    pub last_bonus_at: Option<DateTime<Utc>>,
    pub referred_by: Option<AccountId>,
}

impl Account {
    /// A fresh account with zero balance. Self-referral is dropped.
    pub fn new(id: AccountId, referred_by: Option<AccountId>) -> Self {
        Self {
            id,
            balance: Amount::ZERO,
            last_bonus_at: None,
            referred_by: referred_by.filter(|referrer| *referrer != id),
        }
    }

    /// Earliest instant the recurring bonus may be claimed again.
    ///
    /// `None` means the bonus has never been claimed.
    pub fn next_bonus_at(&self, cooldown: Duration) -> Option<DateTime<Utc>> {
        self.last_bonus_at.map(|at| at + cooldown)
    }

    /// Eligible when never claimed, or when a full cooldown has elapsed
    /// (boundary inclusive).
    pub fn bonus_eligible(&self, now: DateTime<Utc>, cooldown: Duration) -> bool {
        match self.last_bonus_at {
            None => true,
            Some(at) => now - at >= cooldown,
        }
    }

    pub fn can_withdraw(&self, threshold: Amount) -> bool {
        self.balance >= threshold
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_new_account_drops_self_referral() {
        let id = AccountId::new(7);
        assert_eq!(Account::new(id, Some(id)).referred_by, None);
        assert_eq!(
            Account::new(id, Some(AccountId::new(1))).referred_by,
            Some(AccountId::new(1))
        );
    }

    #[test]
    fn test_bonus_eligibility_boundary_is_inclusive() {
        let cooldown = Duration::hours(24);
        let mut account = Account::new(AccountId::new(1), None);
        assert!(account.bonus_eligible(t0(), cooldown));
        assert_eq!(account.next_bonus_at(cooldown), None);

        account.last_bonus_at = Some(t0());
        assert!(!account.bonus_eligible(t0() + Duration::hours(23), cooldown));
        assert!(!account.bonus_eligible(
            t0() + cooldown - Duration::milliseconds(1),
            cooldown
        ));
        assert!(account.bonus_eligible(t0() + cooldown, cooldown));
        assert_eq!(account.next_bonus_at(cooldown), Some(t0() + cooldown));
    }

    #[test]
    fn test_account_id_parses_decimal() {
        assert_eq!("42".parse::<AccountId>().unwrap(), AccountId::new(42));
        assert!("abc".parse::<AccountId>().is_err());
    }
}
