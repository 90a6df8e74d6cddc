//! Host capabilities and backend traits used by the conversation engine.

use crate::conversation::ConversationStatus;
use async_trait::async_trait;
use folio_types::VoiceSettings;
use serde::{Deserialize, Serialize};

/// Continuous speech recognizer provided by the host.
///
/// The host delivers results back through
/// [`VoiceConversation::handle_transcript`](crate::VoiceConversation::handle_transcript),
/// [`handle_recognition_error`](crate::VoiceConversation::handle_recognition_error) and
/// [`handle_recognition_end`](crate::VoiceConversation::handle_recognition_end).
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn start(&self) -> Result<(), RecognizerError>;
    async fn stop(&self) -> Result<(), RecognizerError>;
}

/// Audio output provided by the host.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Play encoded audio; resolves once playback has finished.
    async fn play(&self, audio: Vec<u8>) -> Result<(), PlaybackError>;

    /// Release the output device.
    async fn close(&self) {}
}

/// Chat and speech synthesis as seen from the client side.
#[async_trait]
pub trait ConversationBackend: Send + Sync {
    async fn chat(&self, message: &str) -> Result<String, VoiceError>;
    async fn synthesize(&self, text: &str, settings: &VoiceSettings) -> Result<Vec<u8>, VoiceError>;
}

/// Who produced a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    User,
    Ai,
}

/// Session event callbacks. Every method defaults to doing nothing.
pub trait ConversationListener: Send + Sync {
    fn on_status_change(&self, _status: ConversationStatus) {}
    fn on_connect(&self) {}
    fn on_disconnect(&self) {}
    fn on_message(&self, _source: MessageSource, _message: &str) {}
    fn on_error(&self, _error: &VoiceError) {}
}

/// Listener that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl ConversationListener for NoopListener {}

#[derive(Debug, thiserror::Error)]
pub enum RecognizerError {
    #[error("speech recognition not supported: {0}")]
    Unsupported(String),
    #[error("speech recognition failed: {0}")]
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("audio decode failed: {0}")]
    Decode(String),
    #[error("audio output failed: {0}")]
    Output(String),
}

#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error(transparent)]
    Recognizer(#[from] RecognizerError),
    /// Error event reported by a running recognizer (e.g. `network`, `not-allowed`).
    #[error("Speech recognition error: {0}")]
    Recognition(String),
    #[error("{endpoint} API error: {status}")]
    Status { endpoint: &'static str, status: u16 },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Decode(String),
}
