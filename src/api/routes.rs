//! HTTP route handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

use super::AppState;
use crate::memory::MemoryStore;
use crate::policy::PolicyEngine;
use crate::runner::{AgentRunner, RunResult};
use crate::trading::{TradeEvaluation, TradeIntent, TradingEngine};
use crate::Error;

/// Build the service routes.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/agent/run", post(run_agent))
        .route("/trade/intent", post(evaluate_trade))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub provider: String,
    pub exchange: String,
    pub symbol: String,
    pub max_daily_loss_usd: f64,
    pub dashboard_enabled: bool,
}

/// GET /health - configuration summary.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let settings = &state.settings;
    Json(HealthResponse {
        status: "ok".to_string(),
        provider: settings.cloud_llm_provider.clone(),
        exchange: settings.trading.exchange.clone(),
        symbol: settings.trading.symbol.clone(),
        max_daily_loss_usd: settings.trading.max_daily_loss_usd,
        dashboard_enabled: settings.dashboard_enabled,
    })
}

#[derive(Debug, Deserialize)]
struct RunRequest {
    objective: String,
}

/// POST /agent/run - one plan/review run with a fresh memory store.
async fn run_agent(
    State(state): State<AppState>,
    Json(payload): Json<RunRequest>,
) -> Result<Json<RunResult>, ApiError> {
    if !state.settings.has_api_key() {
        warn!("Agent run requested without OPENAI_API_KEY");
        return Err(ApiError(Error::Config(
            "OPENAI_API_KEY is not configured".to_string(),
        )));
    }

    let mut runner = AgentRunner::new(state.llm.clone(), MemoryStore::new());
    let result = runner.run_once(&payload.objective).await?;
    Ok(Json(result))
}

/// POST /trade/intent - evaluate a trade against the loss limit.
async fn evaluate_trade(
    State(state): State<AppState>,
    Json(intent): Json<TradeIntent>,
) -> Json<TradeEvaluation> {
    let policy = PolicyEngine::new(state.settings.workspace_root.clone());
    let engine = TradingEngine::new(state.settings.trading.clone(), policy);
    Json(engine.evaluate_intent(&intent))
}

/// Maps crate errors onto `{"detail": ...}` responses.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            Error::Config(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::Upstream(_) | Error::Network(_) => (StatusCode::BAD_GATEWAY, self.0.to_string()),
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        };
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "Request failed");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
