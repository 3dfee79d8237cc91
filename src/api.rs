use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::dispatch::{DEFAULT_RECENT_LIMIT, Dispatcher};
use crate::error::DispatchError;
use crate::protocol::{
    CalendarResponse, ChatHistoryResponse, ChatRequest, ChatResponse, FactCheckRequest,
    FactCheckResponse, HealthResponse, LeaderUpdatesResponse, PostAnalysisRequest,
    PostAnalysisResponse, RecentFactChecksResponse,
};

type SharedDispatcher = Arc<Dispatcher>;

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        error!(kind = self.kind(), "Request failed: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "detail": self.to_string() })),
        )
            .into_response()
    }
}

pub fn router(dispatcher: SharedDispatcher, cors: CorsLayer) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/fact-check", post(fact_check))
        .route("/api/analyze-x-post", post(analyze_post))
        .route("/api/leader-updates", get(leader_updates))
        .route("/api/political-calendar", get(political_calendar))
        .route("/api/recent-fact-checks", get(recent_fact_checks))
        .route("/api/chat-history/:session_id", get(chat_history))
        .with_state(dispatcher)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Any origin when `origins` is empty, otherwise exactly the listed ones.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    if origins.is_empty() {
        return Ok(CorsLayer::very_permissive());
    }

    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin `{origin}`"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}

#[derive(Debug, Deserialize)]
struct LeaderUpdatesParams {
    party: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecentFactChecksParams {
    #[serde(default = "default_recent_limit")]
    limit: usize,
}

fn default_recent_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}

async fn health(State(dispatcher): State<SharedDispatcher>) -> Json<HealthResponse> {
    Json(dispatcher.health())
}

async fn chat(
    State(dispatcher): State<SharedDispatcher>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, DispatchError> {
    Ok(Json(dispatcher.chat(request).await?))
}

async fn fact_check(
    State(dispatcher): State<SharedDispatcher>,
    Json(request): Json<FactCheckRequest>,
) -> Result<Json<FactCheckResponse>, DispatchError> {
    Ok(Json(dispatcher.fact_check(request).await?))
}

async fn analyze_post(
    State(dispatcher): State<SharedDispatcher>,
    Json(request): Json<PostAnalysisRequest>,
) -> Result<Json<PostAnalysisResponse>, DispatchError> {
    Ok(Json(dispatcher.analyze_post(request).await?))
}

async fn leader_updates(
    State(dispatcher): State<SharedDispatcher>,
    Query(params): Query<LeaderUpdatesParams>,
) -> Result<Json<LeaderUpdatesResponse>, DispatchError> {
    Ok(Json(dispatcher.leader_updates(params.party).await?))
}

async fn political_calendar(
    State(dispatcher): State<SharedDispatcher>,
) -> Result<Json<CalendarResponse>, DispatchError> {
    Ok(Json(dispatcher.political_calendar().await?))
}

async fn recent_fact_checks(
    State(dispatcher): State<SharedDispatcher>,
    Query(params): Query<RecentFactChecksParams>,
) -> Result<Json<RecentFactChecksResponse>, DispatchError> {
    Ok(Json(dispatcher.recent_fact_checks(params.limit).await?))
}

async fn chat_history(
    State(dispatcher): State<SharedDispatcher>,
    Path(session_id): Path<String>,
) -> Result<Json<ChatHistoryResponse>, DispatchError> {
    Ok(Json(dispatcher.chat_history(&session_id).await?))
}
