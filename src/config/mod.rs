//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod channel;
mod rewards;
mod server;
mod storage;

pub use channel::{BotConfig, ChannelConfig};
pub use rewards::RewardsConfig;
pub use server::ServerConfig;
pub use storage::{PostgresConfig, SqliteConfig, StorageConfig, StorageType};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "REWARD_LEDGER_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "REWARD_LEDGER";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "REWARD_LEDGER_LOG";
/// Environment variable for the chat Bot API token.
pub const BOT_TOKEN_ENV_VAR: &str = "BOT_TOKEN";

use serde::Deserialize;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Ledger storage configuration.
    pub storage: StorageConfig,
    /// Reward amounts, cooldown and withdrawal threshold.
    pub rewards: RewardsConfig,
    /// Gating channel and bot identity.
    pub channel: ChannelConfig,
    /// Chat Bot API client.
    pub bot: BotConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = config.try_deserialize()?;

        // Conventional bot token variable, when the config leaves it empty.
        if config.bot.token.is_empty() {
            if let Ok(token) = std::env::var(BOT_TOKEN_ENV_VAR) {
                config.bot.token = token;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the reward rules cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rewards.validate()?;
        if self.storage.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "storage.max_connections must be at least 1".to_string(),
            ));
        }
        if self.storage.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "storage.timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self::default()
    }
}
