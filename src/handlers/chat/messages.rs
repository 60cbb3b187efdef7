//! Reply texts and keyboards.

use chrono::Duration;
use serde::Serialize;

use super::update::Action;
use crate::config::RewardsConfig;
use crate::domain::Amount;

/// One inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Button {
    Callback { label: String, data: String },
    Url { label: String, url: String },
}

impl Button {
    fn action(label: &str, action: Action) -> Self {
        Button::Callback {
            label: label.to_string(),
            data: action.callback_data().to_string(),
        }
    }

    fn url(label: &str, url: &str) -> Self {
        Button::Url {
            label: label.to_string(),
            url: url.to_string(),
        }
    }
}

/// Text plus inline keyboard rows, ready for the transport to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub keyboard: Vec<Vec<Button>>,
}

impl Reply {
    pub fn new(text: impl Into<String>, keyboard: Vec<Vec<Button>>) -> Self {
        Self {
            text: text.into(),
            keyboard,
        }
    }
}

pub fn join_gate_keyboard(channel_link: &str) -> Vec<Vec<Button>> {
    vec![
        vec![Button::url("✅ Join Channel to Start", channel_link)],
        vec![Button::action("🔄 I have joined!", Action::CheckMembership)],
    ]
}

pub fn main_menu_keyboard() -> Vec<Vec<Button>> {
    vec![
        vec![
            Button::action("💰 Balance", Action::ShowBalance),
            Button::action("🎁 Daily Bonus", Action::ClaimBonus),
        ],
        vec![
            Button::action("👥 Referral Link", Action::ShowReferral),
            Button::action("💸 Withdraw", Action::ShowWithdraw),
        ],
        vec![Button::action("ℹ️ How to Earn", Action::ShowInfo)],
    ]
}

pub fn back_keyboard() -> Vec<Vec<Button>> {
    vec![vec![Button::action("⬅️ Back to Main Menu", Action::MainMenu)]]
}

pub fn welcome(first_name: &str, rules: &RewardsConfig) -> String {
    format!(
        "👋 Welcome {}!\n\n\
         💸 Earn {} per referral.\n\
         🎁 Claim daily bonus.\n\
         💰 Withdraw when balance ≥ {}.\n\n\
         👇 Choose an option:",
        first_name,
        rules.money(rules.referral_reward),
        rules.money(rules.withdraw_threshold),
    )
}

pub const MEMBERSHIP_REQUIRED: &str = "🛑 You must join our channel to use the bot features.";

pub const MEMBERSHIP_CONFIRMED: &str =
    "✅ Thank you for joining! You can now use the bot's features.";

pub const MEMBERSHIP_MISSING: &str = "❌ It seems you haven't joined yet, or the membership \
     check hasn't updated. Please make sure you've joined the channel linked below and try again.";

pub fn balance(rules: &RewardsConfig, balance: Amount, referral_count: usize) -> String {
    format!(
        "💰 Your balance: {}\n\n👥 Total Referrals: {}\n",
        rules.money(balance),
        referral_count
    )
}

pub fn bonus_granted(rules: &RewardsConfig, amount: Amount) -> String {
    format!("🎁 Bonus received! {} added to your balance.", rules.money(amount))
}

/// Remaining cooldown rendered as whole hours and minutes, rounded down.
pub fn bonus_cooling(remaining: Duration) -> String {
    let total_minutes = remaining.num_minutes().max(0);
    format!(
        "⏳ Already claimed today. Come back in {}h {}m.",
        total_minutes / 60,
        total_minutes % 60
    )
}

pub fn referral(rules: &RewardsConfig, link: &str, referral_count: usize) -> String {
    format!(
        "👥 Share your referral link:\n`{}`\n\n\
         Earn {} for each friend who joins and starts the bot through your link!\n\
         You have referred {} friend(s) so far.",
        link,
        rules.money(rules.referral_reward),
        referral_count
    )
}

pub fn referral_credited(
    rules: &RewardsConfig,
    friend_name: &str,
    friend_id: impl std::fmt::Display,
) -> String {
    format!(
        "🎉 Congratulations! Your friend {} ({}) joined using your link and you earned {}!",
        friend_name,
        friend_id,
        rules.money(rules.referral_reward)
    )
}

pub fn withdraw_approved(rules: &RewardsConfig, amount: Amount) -> String {
    format!(
        "✅ Withdrawal requested!\n\
         Your {} will be processed to your provided payment method soon.\n\
         Please allow 24-48 hours for processing. We will contact you if more details are needed.",
        rules.money(amount)
    )
}

pub fn withdraw_declined(rules: &RewardsConfig, balance: Amount, threshold: Amount) -> String {
    format!(
        "❌ You need at least {} to withdraw. Your current balance is {}.",
        rules.money(threshold),
        rules.money(balance)
    )
}

pub fn how_to_earn(rules: &RewardsConfig) -> String {
    format!(
        "📖 *How to Earn:*\n\n\
         1️⃣ 🎁 Claim daily bonus ({}/day)\n\
         2️⃣ 👥 Refer friends ({} per referral)\n\
         3️⃣ 💸 Withdraw at {} minimum balance\n\n\
         Just tap the buttons in the main menu to get started!",
        rules.money(rules.bonus_amount),
        rules.money(rules.referral_reward),
        rules.money(rules.withdraw_threshold)
    )
}
