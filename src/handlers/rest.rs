//! HTTP surface.
//!
//! Endpoints:
//! - `GET /`, `GET /health`: liveness probe
//! - `POST /updates`: chat update in, [`Reply`] out
//! - `GET /accounts/:id`: account summary
//! - `POST /accounts/:id/onboard`: create account, optional `referral_token`
//! - `POST /accounts/:id/bonus`: claim the recurring bonus
//! - `POST /accounts/:id/withdraw`: withdraw the whole balance

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::chat::{ChatHandler, Reply, Update};
use crate::domain::AccountId;
use crate::interfaces::Clock;
use crate::services::reward_engine::{
    AccountSummary, BonusOutcome, ErrorCategory, OnboardOutcome, RewardEngine, RewardError,
    WithdrawOutcome,
};

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: RewardEngine,
    pub chat: Arc<ChatHandler>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(chat: ChatHandler, clock: Arc<dyn Clock>) -> Self {
        Self {
            engine: chat.engine().clone(),
            chat: Arc::new(chat),
            clock,
        }
    }
}

/// Start the HTTP server on `addr`.
///
/// Port 0 binds an ephemeral port; the bound address is always logged.
pub async fn serve(
    state: AppState,
    addr: &str,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(addr = %local, "HTTP server listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Build the axum router (separated for testing).
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/updates", post(handle_update))
        .route("/accounts/:id", get(summary))
        .route("/accounts/:id/onboard", post(onboard))
        .route("/accounts/:id/bonus", post(claim_bonus))
        .route("/accounts/:id/withdraw", post(withdraw))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

impl IntoResponse for RewardError {
    fn into_response(self) -> Response {
        let status = match self.category() {
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCategory::Declined => StatusCode::CONFLICT,
            ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            warn!(error = %self, "Request refused");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handle_update(
    State(state): State<AppState>,
    Json(update): Json<Update>,
) -> Result<Json<Reply>, RewardError> {
    state.chat.handle(update).await.map(Json)
}

async fn summary(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
) -> Result<Json<AccountSummary>, RewardError> {
    state.engine.summary(id).await.map(Json)
}

#[derive(Debug, Default, Deserialize)]
struct OnboardRequest {
    #[serde(default)]
    referral_token: Option<String>,
}

async fn onboard(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
    body: Option<Json<OnboardRequest>>,
) -> Result<Json<OnboardOutcome>, RewardError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    state
        .engine
        .onboard(id, request.referral_token.as_deref())
        .await
        .map(Json)
}

async fn claim_bonus(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
) -> Result<Json<BonusOutcome>, RewardError> {
    let now = state.clock.now();
    state.engine.claim_bonus(id, now).await.map(Json)
}

async fn withdraw(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
) -> Result<Json<WithdrawOutcome>, RewardError> {
    state.engine.withdraw(id).await.map(Json)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::clients::{LogNotifier, StaticMembership};
    use crate::config::{ChannelConfig, RewardsConfig};
    use crate::interfaces::SystemClock;
    use crate::storage::MockLedgerStore;

    fn test_state() -> (AppState, Arc<MockLedgerStore>) {
        let store = Arc::new(MockLedgerStore::new());
        let engine = RewardEngine::new(store.clone(), RewardsConfig::default());
        let chat = ChatHandler::new(
            engine,
            Arc::new(StaticMembership::allow_all()),
            Arc::new(LogNotifier::new()),
            Arc::new(SystemClock),
            ChannelConfig::default(),
        );
        (AppState::new(chat, Arc::new(SystemClock)), store)
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (state, _) = test_state();
        let app = router(state);

        for uri in ["/", "/health"] {
            let (status, _) = call(&app, "GET", uri, None).await;
            assert_eq!(status, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_onboard_referral_and_summary() {
        let (state, _) = test_state();
        let app = router(state);

        let (status, body) = call(&app, "POST", "/accounts/1/onboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_new"], true);

        let (_, body) = call(
            &app,
            "POST",
            "/accounts/2/onboard",
            Some(json!({ "referral_token": "1" })),
        )
        .await;
        assert_eq!(body["credited_referrer"], 1);

        let (status, body) = call(&app, "GET", "/accounts/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["balance"], 500);
        assert_eq!(body["referral_count"], 1);
    }

    #[tokio::test]
    async fn test_bonus_and_withdraw_outcomes() {
        let (state, _) = test_state();
        let app = router(state);
        call(&app, "POST", "/accounts/7/onboard", None).await;

        let (status, body) = call(&app, "POST", "/accounts/7/bonus", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "granted");
        assert_eq!(body["balance"], 100);

        let (_, body) = call(&app, "POST", "/accounts/7/bonus", None).await;
        assert_eq!(body["status"], "cooling");

        let (status, body) = call(&app, "POST", "/accounts/7/withdraw", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "declined");
        assert_eq!(body["threshold"], 5000);
    }

    #[tokio::test]
    async fn test_error_status_codes() {
        let (state, store) = test_state();
        let app = router(state);

        let (status, body) = call(&app, "GET", "/accounts/404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("404"));

        store.set_unavailable(true).await;
        let (status, _) = call(&app, "POST", "/accounts/1/withdraw", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_updates_endpoint_returns_reply() {
        let (state, _) = test_state();
        let app = router(state);

        let (status, body) = call(
            &app,
            "POST",
            "/updates",
            Some(json!({ "type": "start", "user": { "id": 3, "first_name": "Mia" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["text"].as_str().unwrap().starts_with("👋 Welcome Mia!"));
        assert_eq!(body["keyboard"][0][0]["data"], "show_balance");
    }
}
