//! Gating channel and Bot API configuration.

use serde::Deserialize;

/// The channel users must join before using reward actions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Public invite link shown on the join button.
    pub link: String,
    /// Chat id used for membership lookups.
    pub chat_id: i64,
    /// Bot username used to build referral deep links.
    pub bot_username: String,
    /// When false, every user counts as a member.
    pub require_membership: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            link: "https://t.me/dailyearn11".to_string(),
            chat_id: -1001441974665,
            bot_username: String::new(),
            require_membership: true,
        }
    }
}

/// Bot API client configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Base URL of the Bot API.
    pub api_url: String,
    /// Bot token. Empty disables the Bot API collaborators.
    pub token: String,
    /// Per-request timeout, in milliseconds.
    pub timeout_ms: u64,
}

impl BotConfig {
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty()
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.telegram.org".to_string(),
            token: String::new(),
            timeout_ms: 10_000,
        }
    }
}
