//! Referral tokens carried by invite links.
//!
//! A token is the referrer's account id in decimal. The chat transport puts
//! it in the bot deep link (`https://t.me/<bot>?start=<token>`) and hands the
//! raw `start` argument back on first contact.

use std::fmt;

use super::AccountId;

/// Malformed referral token. Onboarding treats it as "no referrer".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid referral token: {0:?}")]
pub struct InvalidReferralToken(pub String);

/// Opaque invite token resolving to a referrer account id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferralToken(AccountId);

impl ReferralToken {
    pub fn for_account(id: AccountId) -> Self {
        Self(id)
    }

    /// Parse a raw token. Only non-empty runs of ASCII digits that fit an
    /// account id are well formed; signs, whitespace and overflow are not.
    pub fn parse(raw: &str) -> Result<Self, InvalidReferralToken> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidReferralToken(raw.to_string()));
        }
        raw.parse::<i64>()
            .map(|id| Self(AccountId::new(id)))
            .map_err(|_| InvalidReferralToken(raw.to_string()))
    }

    pub fn account_id(&self) -> AccountId {
        self.0
    }

    /// Deep link that starts the bot with this token.
    pub fn link(&self, bot_username: &str) -> String {
        format!("https://t.me/{}?start={}", bot_username, self)
    }
}

impl fmt::Display for ReferralToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
