//! HTTP API v1.
//!
//! Endpoints:
//!
//! - `POST /v1/chat`: `{message, history}` → `{reply}`
//! - `POST /v1/research/stream`: `{query}` → SSE stream of research events

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use parley_agent::ChatTurn;
use parley_research::{ResearchError, ResearchEvent};

use crate::SharedState;

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/research/stream", post(research_stream_handler))
        .with_state(state)
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Deserialize)]
pub struct ResearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

// ── Chat ──────────────────────────────────────────────────────────────────

/// `POST /v1/chat`: One persona chat turn.
async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(bad_request("message must not be empty"));
    }
    info!(
        message_len = payload.message.len(),
        history = payload.history.len(),
        "v1/chat request"
    );

    let reply = state
        .chat
        .reply(&payload.history, &payload.message)
        .await
        .map_err(|e| {
            warn!(error = %e, "Chat turn failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("Chat failed: {e}"),
                }),
            )
        })?;

    Ok(Json(ChatResponse { reply }))
}

// ── Research SSE ──────────────────────────────────────────────────────────

/// `POST /v1/research/stream`: Run the research pipeline and stream its
/// progress. A stage failure arrives as a final `error` event. Closing the
/// connection cancels the run.
async fn research_stream_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ResearchRequest>,
) -> Result<Sse<impl futures::Stream<Item = Result<SseEvent, Infallible>>>, ApiError> {
    if payload.query.trim().is_empty() {
        return Err(bad_request("query must not be empty"));
    }
    info!(query_len = payload.query.len(), "v1/research/stream SSE request");

    let rx = state.research.run(payload.query);
    let stream = ReceiverStream::new(rx).map(|item| Ok(to_sse(item)));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[derive(Serialize)]
struct StreamError {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<&'static str>,
}

fn to_sse(item: Result<ResearchEvent, ResearchError>) -> SseEvent {
    match item {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            SseEvent::default().event(event.name()).data(data)
        }
        Err(e) => {
            let data = serde_json::to_string(&StreamError {
                error: e.to_string(),
                stage: e.stage(),
            })
            .unwrap_or_default();
            SseEvent::default().event("error").data(data)
        }
    }
}
