//! Inbound chat updates.

use serde::{Deserialize, Serialize};

use crate::domain::AccountId;

/// The chat user behind an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUser {
    pub id: AccountId,
    #[serde(default)]
    pub first_name: String,
}

/// A transport event the chat handler reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Update {
    /// `/start`, optionally with the deep-link argument.
    Start {
        user: ChatUser,
        #[serde(default)]
        token: Option<String>,
    },
    /// An inline keyboard button press carrying its callback data.
    Button { user: ChatUser, data: String },
}

impl Update {
    pub fn user(&self) -> &ChatUser {
        match self {
            Update::Start { user, .. } | Update::Button { user, .. } => user,
        }
    }
}

/// Button actions, keyed by callback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MainMenu,
    CheckMembership,
    ShowBalance,
    ClaimBonus,
    ShowReferral,
    ShowWithdraw,
    ShowInfo,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::MainMenu,
        Action::CheckMembership,
        Action::ShowBalance,
        Action::ClaimBonus,
        Action::ShowReferral,
        Action::ShowWithdraw,
        Action::ShowInfo,
    ];

    pub fn callback_data(self) -> &'static str {
        match self {
            Action::MainMenu => "main_menu",
            Action::CheckMembership => "check_membership",
            Action::ShowBalance => "show_balance",
            Action::ClaimBonus => "claim_bonus",
            Action::ShowReferral => "show_referral",
            Action::ShowWithdraw => "show_withdraw",
            Action::ShowInfo => "show_info",
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.callback_data() == data)
    }
}
