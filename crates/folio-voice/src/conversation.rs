//! Conversation session: lifecycle, message turn, and playback with the
//! recognizer paused so the microphone never hears the assistant.

use crate::capability::{
    AudioPlayer, ConversationBackend, ConversationListener, MessageSource, NoopListener,
    SpeechRecognizer, VoiceError,
};
use folio_types::VoiceSettings;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

pub const DEFAULT_WELCOME_MESSAGE: &str = "Hello, welcome to G's portfolio!, How can I help you?";

/// Reply shown and spoken when the chat endpoint fails.
pub const CHAT_FALLBACK_REPLY: &str = "Sorry, I couldn't process that.";

/// Recognizer error codes that are part of normal operation.
const BENIGN_RECOGNITION_ERRORS: [&str; 2] = ["no-speech", "aborted"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl ConversationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConversationStatus::Disconnected => "disconnected",
            ConversationStatus::Connecting => "connecting",
            ConversationStatus::Connected => "connected",
            ConversationStatus::Disconnecting => "disconnecting",
        }
    }
}

impl std::fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct ConversationConfig {
    pub voice: VoiceSettings,
    /// Spoken right after the session connects; `None` skips the greeting.
    pub welcome_message: Option<String>,
    pub mic_muted: bool,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            voice: VoiceSettings::default(),
            welcome_message: Some(DEFAULT_WELCOME_MESSAGE.to_string()),
            mic_muted: false,
        }
    }
}

/// Clears the in-flight flag when a message turn ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One voice conversation: recognizer → chat → TTS → playback.
pub struct VoiceConversation {
    backend: Arc<dyn ConversationBackend + Send + Sync>,
    recognizer: Arc<dyn SpeechRecognizer + Send + Sync>,
    player: Arc<dyn AudioPlayer + Send + Sync>,
    listener: Arc<dyn ConversationListener + Send + Sync>,
    voice: VoiceSettings,
    welcome_message: Option<String>,
    status: RwLock<ConversationStatus>,
    speaking: AtomicBool,
    in_flight: AtomicBool,
    mic_muted: AtomicBool,
}

impl VoiceConversation {
    pub fn new(
        backend: Arc<dyn ConversationBackend + Send + Sync>,
        recognizer: Arc<dyn SpeechRecognizer + Send + Sync>,
        player: Arc<dyn AudioPlayer + Send + Sync>,
        config: ConversationConfig,
    ) -> Self {
        Self {
            backend,
            recognizer,
            player,
            listener: Arc::new(NoopListener),
            voice: config.voice,
            welcome_message: config.welcome_message,
            status: RwLock::new(ConversationStatus::Disconnected),
            speaking: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
            mic_muted: AtomicBool::new(config.mic_muted),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn ConversationListener + Send + Sync>) -> Self {
        self.listener = listener;
        self
    }

    pub async fn status(&self) -> ConversationStatus {
        *self.status.read().await
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::Acquire)
    }

    pub fn is_mic_muted(&self) -> bool {
        self.mic_muted.load(Ordering::Acquire)
    }

    pub fn set_mic_muted(&self, muted: bool) {
        self.mic_muted.store(muted, Ordering::Release);
    }

    async fn set_status(&self, status: ConversationStatus) {
        *self.status.write().await = status;
        self.announce(status);
    }

    fn announce(&self, status: ConversationStatus) {
        tracing::debug!(status = %status, "conversation status changed");
        self.listener.on_status_change(status);
    }

    /// Move from `from` to `to` only if nothing else changed the status since.
    async fn transition(&self, from: ConversationStatus, to: ConversationStatus) -> bool {
        {
            let mut status = self.status.write().await;
            if *status != from {
                return false;
            }
            *status = to;
        }
        self.announce(to);
        true
    }

    /// Connect: start listening, then speak the welcome message.
    ///
    /// Fails (and returns to `Disconnected`) only when the recognizer cannot
    /// start. Calling this on a session that is already up is a no-op, and an
    /// `end_session` issued while connecting wins.
    pub async fn start_session(&self) -> Result<(), VoiceError> {
        {
            let mut status = self.status.write().await;
            let current = *status;
            if matches!(
                current,
                ConversationStatus::Connecting
                    | ConversationStatus::Connected
                    | ConversationStatus::Disconnecting
            ) {
                tracing::debug!(status = %current, "start_session ignored, session busy");
                return Ok(());
            }
            *status = ConversationStatus::Connecting;
        }
        self.announce(ConversationStatus::Connecting);

        if let Err(e) = self.recognizer.start().await {
            tracing::error!(error = %e, "failed to start session");
            self.transition(
                ConversationStatus::Connecting,
                ConversationStatus::Disconnected,
            )
            .await;
            let err = VoiceError::from(e);
            self.listener.on_error(&err);
            return Err(err);
        }

        if !self
            .transition(ConversationStatus::Connecting, ConversationStatus::Connected)
            .await
        {
            tracing::debug!("session ended while connecting");
            if let Err(e) = self.recognizer.stop().await {
                tracing::warn!(error = %e, "recognizer stop failed after cancelled connect");
            }
            return Ok(());
        }
        self.listener.on_connect();

        if let Some(welcome) = self.welcome_message.clone() {
            self.speak(&welcome).await;
        }
        Ok(())
    }

    /// Disconnect. A no-op while already disconnected or disconnecting.
    pub async fn end_session(&self) {
        {
            let mut status = self.status.write().await;
            if matches!(
                *status,
                ConversationStatus::Disconnected | ConversationStatus::Disconnecting
            ) {
                return;
            }
            *status = ConversationStatus::Disconnecting;
        }
        self.announce(ConversationStatus::Disconnecting);

        if let Err(e) = self.recognizer.stop().await {
            tracing::warn!(error = %e, "recognizer stop failed during shutdown");
        }
        self.player.close().await;
        self.set_status(ConversationStatus::Disconnected).await;
        self.listener.on_disconnect();
    }

    /// Run one message turn. Returns `false` when the message was ignored
    /// (blank, assistant speaking, or a previous turn still in flight).
    pub async fn send_user_message(&self, message: &str) -> bool {
        if message.trim().is_empty() || self.is_speaking() {
            return false;
        }
        let Some(_in_flight) = InFlight::acquire(&self.in_flight) else {
            tracing::debug!("message dropped, previous turn still in flight");
            return false;
        };

        self.listener.on_message(MessageSource::User, message);

        let reply = match self.backend.chat(message).await {
            Ok(reply) if !reply.is_empty() => reply,
            Ok(_) => CHAT_FALLBACK_REPLY.to_string(),
            Err(e) => {
                tracing::error!(error = %e, "chat request failed");
                CHAT_FALLBACK_REPLY.to_string()
            }
        };
        self.listener.on_message(MessageSource::Ai, &reply);

        self.speak(&reply).await;
        true
    }

    /// Final transcript from the recognizer.
    pub async fn handle_transcript(&self, transcript: &str) -> bool {
        if transcript.trim().is_empty() || self.is_mic_muted() {
            return false;
        }
        self.send_user_message(transcript).await
    }

    pub fn handle_recognition_error(&self, code: &str) {
        if BENIGN_RECOGNITION_ERRORS.contains(&code) {
            return;
        }
        tracing::error!(code, "speech recognition error");
        self.listener
            .on_error(&VoiceError::Recognition(code.to_string()));
    }

    /// The recognizer stopped on its own; resume listening while the session
    /// is up and nothing is playing.
    pub async fn handle_recognition_end(&self) {
        if self.status().await != ConversationStatus::Connected || self.is_speaking() {
            return;
        }
        if let Err(e) = self.recognizer.start().await {
            tracing::warn!(error = %e, "recognizer restart failed");
        }
    }

    /// The voice API has no context channel; updates are dropped.
    pub fn send_contextual_update(&self, context: &str) {
        tracing::debug!(chars = context.len(), "contextual update ignored");
    }

    async fn speak(&self, text: &str) {
        match self.backend.synthesize(text, &self.voice).await {
            Ok(audio) => self.play(audio).await,
            Err(e) => {
                tracing::error!(error = %e, "speech synthesis failed");
                self.listener.on_error(&e);
            }
        }
    }

    async fn play(&self, audio: Vec<u8>) {
        // set before stopping, so an end event raised by stop() does not
        // restart the mic
        self.speaking.store(true, Ordering::Release);
        if let Err(e) = self.recognizer.stop().await {
            tracing::debug!(error = %e, "recognizer stop before playback failed");
        }
        if let Err(e) = self.player.play(audio).await {
            tracing::error!(error = %e, "audio playback failed");
        }
        self.speaking.store(false, Ordering::Release);

        if self.status().await == ConversationStatus::Connected {
            if let Err(e) = self.recognizer.start().await {
                tracing::debug!(error = %e, "recognizer resume after playback failed");
            }
        }
    }
}
