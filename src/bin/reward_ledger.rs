//! reward-ledger: referral, daily-bonus and withdrawal ledger service
//!
//! ## Architecture
//! ```text
//! [Chat transport] --POST /updates--> [ChatHandler] --> [RewardEngine] --> [LedgerStore]
//!                                          |                                   |
//!                                          v                                   v
//!                              [Bot API: membership, notify]          [SQLite/Postgres]
//! ```
//!
//! ## Configuration
//! - `config.yaml`, `--config <path>` or REWARD_LEDGER_CONFIG
//! - REWARD_LEDGER__SECTION__KEY overrides, e.g. REWARD_LEDGER__SERVER__PORT
//! - BOT_TOKEN: Bot API token (local collaborators are used when unset)
//! - REWARD_LEDGER_LOG: log filter (default: info)

use std::sync::Arc;

use tracing::{error, info, warn};

use reward_ledger::clients::{BotApiClient, LogNotifier, StaticMembership};
use reward_ledger::config::Config;
use reward_ledger::handlers::{serve, AppState, ChatHandler};
use reward_ledger::interfaces::{MembershipOracle, Notifier, SystemClock};
use reward_ledger::services::RewardEngine;
use reward_ledger::storage::init_storage;
use reward_ledger::utils::bootstrap::{init_tracing, parse_config_path, shutdown_signal};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        storage = ?config.storage.storage_type,
        port = config.server.port,
        "Starting reward-ledger"
    );

    let store = init_storage(&config.storage).await?;
    let engine = RewardEngine::new(store, config.rewards.clone())
        .with_store_timeout(config.storage.timeout());

    let (membership, notifier): (Arc<dyn MembershipOracle>, Arc<dyn Notifier>) =
        if config.bot.is_configured() {
            let client = Arc::new(BotApiClient::new(&config.bot, config.channel.chat_id)?);
            (client.clone(), client)
        } else {
            warn!("No bot token configured; admitting everyone and logging notifications");
            (
                Arc::new(StaticMembership::allow_all()),
                Arc::new(LogNotifier::new()),
            )
        };

    let clock = Arc::new(SystemClock);
    let chat = ChatHandler::new(
        engine,
        membership,
        notifier,
        clock.clone(),
        config.channel.clone(),
    );

    serve(
        AppState::new(chat, clock),
        &config.server.bind_address(),
        shutdown_signal(),
    )
    .await
    .map_err(|e| -> Box<dyn std::error::Error> { e })?;

    info!("reward-ledger stopped");
    Ok(())
}
