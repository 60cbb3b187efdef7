//! Chat handler.
//!
//! Turns chat updates (`/start` and inline button presses) into reward
//! engine calls and renders the outcome as a [`Reply`]. Reward actions are
//! gated on channel membership; the engine itself never checks it.

pub mod messages;
mod update;


pub use messages::{Button, Reply};
pub use update::{Action, ChatUser, Update};

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::config::ChannelConfig;
use crate::domain::{AccountId, ReferralToken};
use crate::interfaces::{Clock, MembershipOracle, Notifier};
use crate::services::reward_engine::{
    BonusOutcome, Result, RewardEngine, WithdrawOutcome,
};

/// Chat transport adapter over the reward engine.
pub struct ChatHandler {
    engine: RewardEngine,
    membership: Arc<dyn MembershipOracle>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    channel: ChannelConfig,
}

impl ChatHandler {
    pub fn new(
        engine: RewardEngine,
        membership: Arc<dyn MembershipOracle>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        channel: ChannelConfig,
    ) -> Self {
        Self {
            engine,
            membership,
            notifier,
            clock,
            channel,
        }
    }

    pub fn engine(&self) -> &RewardEngine {
        &self.engine
    }

    #[tracing::instrument(name = "chat.handle", skip_all, fields(account = %update.user().id))]
    pub async fn handle(&self, update: Update) -> Result<Reply> {
        match update {
            Update::Start { user, token } => self.start(&user, token.as_deref()).await,
            Update::Button { user, data } => self.button(&user, &data).await,
        }
    }

    async fn is_member(&self, id: AccountId) -> bool {
        !self.channel.require_membership || self.membership.is_member(id).await
    }

    async fn start(&self, user: &ChatUser, token: Option<&str>) -> Result<Reply> {
        let outcome = self.engine.onboard(user.id, token).await?;

        if let Some(referrer) = outcome.credited_referrer {
            let message =
                messages::referral_credited(self.engine.rules(), &user.first_name, user.id);
            if let Err(e) = self.notifier.notify(referrer, &message).await {
                error!(referrer = %referrer, error = %e, "Could not send referral message");
            }
        }

        let text = messages::welcome(&user.first_name, self.engine.rules());
        Ok(self.menu(user.id, text).await)
    }

    /// Main menu for members, the join gate for everyone else.
    async fn menu(&self, id: AccountId, text: String) -> Reply {
        if self.is_member(id).await {
            Reply::new(text, messages::main_menu_keyboard())
        } else {
            Reply::new(text, messages::join_gate_keyboard(&self.channel.link))
        }
    }

    async fn button(&self, user: &ChatUser, data: &str) -> Result<Reply> {
        let id = user.id;
        if self.engine.onboard(id, None).await?.is_new {
            warn!("Unknown account pressed a button; created without referrer");
        }

        let action = Action::parse(data);
        let member = self.is_member(id).await;
        if !member && action != Some(Action::CheckMembership) {
            return Ok(Reply::new(
                messages::MEMBERSHIP_REQUIRED,
                messages::join_gate_keyboard(&self.channel.link),
            ));
        }

        let Some(action) = action else {
            debug!(data = %data, "Ignoring unknown callback data");
            let text = messages::welcome(&user.first_name, self.engine.rules());
            return Ok(self.menu(id, text).await);
        };

        let rules = self.engine.rules();
        let reply = match action {
            Action::MainMenu => {
                self.menu(id, messages::welcome(&user.first_name, rules))
                    .await
            }
            Action::CheckMembership if member => Reply::new(
                messages::MEMBERSHIP_CONFIRMED,
                messages::main_menu_keyboard(),
            ),
            Action::CheckMembership => Reply::new(
                messages::MEMBERSHIP_MISSING,
                messages::join_gate_keyboard(&self.channel.link),
            ),
            Action::ShowBalance => {
                let summary = self.engine.summary(id).await?;
                Reply::new(
                    messages::balance(rules, summary.balance, summary.referral_count),
                    messages::back_keyboard(),
                )
            }
            Action::ClaimBonus => {
                let now = self.clock.now();
                let text = match self.engine.claim_bonus(id, now).await? {
                    BonusOutcome::Granted { amount, .. } => messages::bonus_granted(rules, amount),
                    BonusOutcome::Cooling { next_eligible_at } => {
                        messages::bonus_cooling(next_eligible_at - now)
                    }
                };
                Reply::new(text, messages::back_keyboard())
            }
            Action::ShowReferral => {
                let link = ReferralToken::for_account(id).link(&self.channel.bot_username);
                let summary = self.engine.summary(id).await?;
                Reply::new(
                    messages::referral(rules, &link, summary.referral_count),
                    messages::back_keyboard(),
                )
            }
            Action::ShowWithdraw => {
                let text = match self.engine.withdraw(id).await? {
                    WithdrawOutcome::Approved { amount } => {
                        messages::withdraw_approved(rules, amount)
                    }
                    WithdrawOutcome::Declined { balance, threshold } => {
                        messages::withdraw_declined(rules, balance, threshold)
                    }
                };
                Reply::new(text, messages::back_keyboard())
            }
            Action::ShowInfo => Reply::new(messages::how_to_earn(rules), messages::back_keyboard()),
        };

        Ok(reply)
    }
}
