//! Clients for the collaborators around the reward engine.
//!
//! - `bot_api`: chat Bot API over HTTP (membership checks, notifications)
//! - `local`: in-process stand-ins for runs without a bot token

pub mod bot_api;
pub mod local;

pub use bot_api::{BotApiClient, BotApiError};
pub use local::{LogNotifier, StaticMembership};
