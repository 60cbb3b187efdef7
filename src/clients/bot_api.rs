//! Bot API HTTP client.
//!
//! Implements [`MembershipOracle`] with `getChatMember` against the gating
//! channel and [`Notifier`] with `sendMessage`.

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::config::BotConfig;
use crate::domain::AccountId;
use crate::interfaces::{MembershipOracle, NotifyError, Notifier};

/// Member statuses that grant access.
const MEMBER_STATUSES: [&str; 3] = ["member", "administrator", "creator"];

/// Errors from the Bot API.
#[derive(Debug, thiserror::Error)]
pub enum BotApiError {
    #[error("Bot API not configured: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bot API unavailable: {0}")]
    Unavailable(String),

    #[error("Bot API rejected {method}: {description}")]
    Rejected { method: String, description: String },
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMember {
    status: String,
}

/// Bot API client bound to one bot token and one gating channel.
pub struct BotApiClient {
    client: Client,
    base_url: String,
    channel_id: i64,
}

impl BotApiClient {
    pub fn new(config: &BotConfig, channel_id: i64) -> Result<Self, BotApiError> {
        if !config.is_configured() {
            return Err(BotApiError::Config("bot token not set".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", config.api_url.trim_end_matches('/'), config.token),
            channel_id,
        })
    }

    fn backoff() -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(3)
            .with_jitter()
    }

    fn is_retryable(err: &BotApiError) -> bool {
        match err {
            BotApiError::Http(e) => e.is_timeout() || e.is_connect(),
            BotApiError::Unavailable(_) => true,
            _ => false,
        }
    }

    /// Call one Bot API method and unwrap its `result`.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, BotApiError> {
        let url = format!("{}/{}", self.base_url, method);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(BotApiError::Unavailable(format!("{} returned {}", method, status)));
        }

        let parsed: ApiResponse<T> = response.json().await?;
        match parsed.result {
            Some(result) if parsed.ok => Ok(result),
            _ => Err(BotApiError::Rejected {
                method: method.to_string(),
                description: parsed
                    .description
                    .unwrap_or_else(|| format!("HTTP {}", status)),
            }),
        }
    }

    /// Membership status of `user` in the gating channel, e.g. `member`.
    pub async fn chat_member_status(&self, user: AccountId) -> Result<String, BotApiError> {
        let body = json!({ "chat_id": self.channel_id, "user_id": user.get() });
        let member = (|| async { self.call::<ChatMember>("getChatMember", &body).await })
            .retry(Self::backoff())
            .when(Self::is_retryable)
            .await?;
        Ok(member.status)
    }

    pub async fn send_message(&self, chat_id: AccountId, text: &str) -> Result<(), BotApiError> {
        let body = json!({ "chat_id": chat_id.get(), "text": text });
        (|| async { self.call::<serde_json::Value>("sendMessage", &body).await })
            .retry(Self::backoff())
            .when(Self::is_retryable)
            .await?;
        debug!(chat_id = %chat_id, "Message sent");
        Ok(())
    }
}

#[async_trait]
impl MembershipOracle for BotApiClient {
    async fn is_member(&self, id: AccountId) -> bool {
        match self.chat_member_status(id).await {
            Ok(status) => MEMBER_STATUSES.contains(&status.as_str()),
            Err(e) => {
                error!(
                    account = %id,
                    channel = self.channel_id,
                    error = %e,
                    "Error checking channel membership"
                );
                false
            }
        }
    }
}

#[async_trait]
impl Notifier for BotApiClient {
    async fn notify(&self, id: AccountId, message: &str) -> Result<(), NotifyError> {
        self.send_message(id, message).await.map_err(|e| {
            warn!(account = %id, error = %e, "Notification not delivered");
            NotifyError::Delivery(e.to_string())
        })
    }
}
