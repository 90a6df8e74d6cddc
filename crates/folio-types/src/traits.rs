//! Traits for upstream clients and the conversation history store.

use crate::{ChatMessage, VoiceSettings};
use async_trait::async_trait;
use std::time::Duration;

/// Chat completion backend (OpenAI-compatible).
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// Complete a conversation. Returns `Ok(None)` when the upstream answered
    /// successfully but produced no content.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Option<String>, ChatError>;
}

/// Text-to-speech backend.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text`; returns encoded audio (MPEG).
    async fn synthesize(&self, text: &str, settings: &VoiceSettings) -> Result<Vec<u8>, TtsError>;
}

/// Per-session conversation history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append one turn to the session, creating the session if needed.
    async fn append(&self, session_id: &str, message: ChatMessage) -> Result<(), HistoryError>;

    /// The last `limit` turns of the session, oldest first.
    async fn recent(&self, session_id: &str, limit: usize)
        -> Result<Vec<ChatMessage>, HistoryError>;

    /// Every stored turn of the session, oldest first.
    async fn history(&self, session_id: &str) -> Result<Vec<ChatMessage>, HistoryError>;

    /// Drop all turns of the session.
    async fn clear(&self, session_id: &str) -> Result<(), HistoryError>;

    /// Remove sessions untouched for longer than `max_idle`; returns how many were removed.
    async fn purge_idle(&self, max_idle: Duration) -> Result<usize, HistoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Network-level failure: the request never produced a response.
    #[error("chat transport error: {0}")]
    Transport(String),
    #[error("chat API returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("chat response parse error: {0}")]
    Parse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    #[error("tts transport error: {0}")]
    Transport(String),
    #[error("tts API returned {status}: {body}")]
    Upstream { status: u16, body: String },
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history store error: {0}")]
    Other(String),
}
