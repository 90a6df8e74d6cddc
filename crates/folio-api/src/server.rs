//! Axum server and routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use folio_types::{
    ChatCompleter, ChatHistoryResponse, ChatMessage, ChatReply, ChatRequest, ClearResponse,
    ErrorBody, HistoryStore, SpeechSynthesizer, TtsError, TtsRequest, DEFAULT_SESSION_ID,
    SESSION_HEADER,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Reply used when the upstream answers without content.
pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't generate a response.";

/// Turns sent upstream per completion (system prompt excluded).
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

pub struct AppState {
    /// `None` when no chat API key is configured.
    pub chat: Option<Arc<dyn ChatCompleter + Send + Sync>>,
    /// `None` when no TTS API key is configured.
    pub tts: Option<Arc<dyn SpeechSynthesizer + Send + Sync>>,
    pub history: Arc<dyn HistoryStore + Send + Sync>,
    pub system_prompt: String,
    pub history_window: usize,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/chat",
            post(handle_chat).get(handle_history).delete(handle_clear),
        )
        .route("/api/langvoice/tts", post(handle_tts))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Periodically drop sessions idle for longer than `max_idle`.
pub fn spawn_idle_sweeper(
    history: Arc<dyn HistoryStore + Send + Sync>,
    max_idle: Duration,
) -> tokio::task::JoinHandle<()> {
    let period = (max_idle / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match history.purge_idle(max_idle).await {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "idle chat sessions purged"),
                Err(e) => tracing::warn!(error = %e, "idle session purge failed"),
            }
        }
    })
}

/// Errors surfaced as JSON `{ "error": ... }` bodies.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotConfigured(String),
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotConfigured(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream { status, .. } => *status,
        };
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "rejected request body");
        ApiError::BadRequest("Invalid JSON body".to_string())
    }
}

fn upstream_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}

/// Session id from the `x-session-id` header, or the shared default session.
pub fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SESSION_ID)
        .to_string()
}

async fn handle_chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(req) = payload?;
    let session = session_id(&headers);
    let message = req
        .message()
        .ok_or_else(|| ApiError::BadRequest("Message is required".to_string()))?;
    tracing::debug!(session = %session, chars = message.len(), "chat message received");

    let chat = state.chat.as_ref().ok_or_else(|| {
        tracing::error!("chat requested but GROQ_API_KEY is not set");
        ApiError::NotConfigured("Groq API key not configured".to_string())
    })?;

    let history_err = |e: folio_types::HistoryError| {
        tracing::error!(error = %e, "history store failure");
        ApiError::Internal
    };
    state
        .history
        .append(&session, ChatMessage::user(message))
        .await
        .map_err(history_err)?;
    let recent = state
        .history
        .recent(&session, state.history_window)
        .await
        .map_err(history_err)?;

    let mut messages = Vec::with_capacity(recent.len() + 1);
    messages.push(ChatMessage::system(state.system_prompt.clone()));
    messages.extend(recent);

    let reply = match chat.complete(&messages).await {
        Ok(content) => content.unwrap_or_else(|| FALLBACK_REPLY.to_string()),
        Err(folio_types::ChatError::Upstream { status, body }) => {
            tracing::error!(status, body = %body, "Groq API error");
            return Err(ApiError::Upstream {
                status: upstream_status(status),
                message: format!("Groq API error: {}", status),
            });
        }
        Err(e) => {
            tracing::error!(error = %e, "chat completion failed");
            return Err(ApiError::Internal);
        }
    };

    state
        .history
        .append(&session, ChatMessage::assistant(reply.clone()))
        .await
        .map_err(history_err)?;

    Ok(Json(ChatReply { response: reply }))
}

async fn handle_history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ChatHistoryResponse>, ApiError> {
    let session = session_id(&headers);
    let history = state.history.history(&session).await.map_err(|e| {
        tracing::error!(error = %e, "history store failure");
        ApiError::Internal
    })?;
    Ok(Json(ChatHistoryResponse { history }))
}

async fn handle_clear(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ClearResponse>, ApiError> {
    let session = session_id(&headers);
    state.history.clear(&session).await.map_err(|e| {
        tracing::error!(error = %e, "history store failure");
        ApiError::Internal
    })?;
    tracing::debug!(session = %session, "chat history cleared");
    Ok(Json(ClearResponse { success: true }))
}

async fn handle_tts(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TtsRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let text = req
        .text()
        .ok_or_else(|| ApiError::BadRequest("Text is required".to_string()))?;

    let tts = state.tts.as_ref().ok_or_else(|| {
        tracing::error!("tts requested but LANGVOICE_API_KEY is not set");
        ApiError::NotConfigured("API key not configured".to_string())
    })?;

    let settings = req.settings();
    let audio = match tts.synthesize(text, &settings).await {
        Ok(audio) => audio,
        Err(TtsError::Upstream { status, body }) => {
            tracing::error!(status, body = %body, "LangVoice API error");
            return Err(ApiError::Upstream {
                status: upstream_status(status),
                message: format!("LangVoice API error: {}", status),
            });
        }
        Err(e) => {
            tracing::error!(error = %e, "TTS proxy error");
            return Err(ApiError::Internal);
        }
    };

    let len = audio.len();
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/mpeg".to_string()),
            (header::CONTENT_LENGTH, len.to_string()),
        ],
        audio,
    )
        .into_response())
}

async fn handle_health() -> &'static str {
    "ok"
}
