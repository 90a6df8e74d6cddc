//! Mock chat completer and synthesizer for tests: deterministic output, no network.

use async_trait::async_trait;
use folio_types::{
    ChatCompleter, ChatError, ChatMessage, Role, SpeechSynthesizer, TtsError, VoiceSettings,
};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy)]
enum Behavior {
    Echo,
    Empty,
    Status(u16),
    Transport,
}

/// Completer that echoes the last user turn as `echo: <text>` and records
/// every message list it receives.
pub struct MockChatCompleter {
    behavior: Behavior,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockChatCompleter {
    pub fn new() -> Self {
        Self::with_behavior(Behavior::Echo)
    }

    /// Succeeds with no content.
    pub fn empty() -> Self {
        Self::with_behavior(Behavior::Empty)
    }

    /// Fails with an upstream status.
    pub fn failing_with(status: u16) -> Self {
        Self::with_behavior(Behavior::Status(status))
    }

    /// Fails as if the upstream was unreachable.
    pub fn unreachable() -> Self {
        Self::with_behavior(Behavior::Transport)
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Message lists received so far, in call order.
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for MockChatCompleter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatCompleter for MockChatCompleter {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Option<String>, ChatError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }
        match self.behavior {
            Behavior::Echo => {
                let last = messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::User)
                    .map(|m| m.content.as_str())
                    .unwrap_or("");
                Ok(Some(format!("echo: {}", last)))
            }
            Behavior::Empty => Ok(None),
            Behavior::Status(status) => Err(ChatError::Upstream {
                status,
                body: "mock upstream failure".to_string(),
            }),
            Behavior::Transport => Err(ChatError::Transport("connection refused".to_string())),
        }
    }
}

/// Synthesizer that returns a fake MPEG frame header followed by the text bytes.
pub struct MockSynthesizer {
    behavior: Behavior,
    calls: Mutex<Vec<(String, VoiceSettings)>>,
}

impl MockSynthesizer {
    pub const FRAME_HEADER: [u8; 4] = [0xff, 0xfb, 0x90, 0x00];

    pub fn new() -> Self {
        Self::with_behavior(Behavior::Echo)
    }

    pub fn failing_with(status: u16) -> Self {
        Self::with_behavior(Behavior::Status(status))
    }

    pub fn unreachable() -> Self {
        Self::with_behavior(Behavior::Transport)
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The audio this mock produces for `text`.
    pub fn audio_for(text: &str) -> Vec<u8> {
        let mut out = Self::FRAME_HEADER.to_vec();
        out.extend_from_slice(text.as_bytes());
        out
    }

    pub fn calls(&self) -> Vec<(String, VoiceSettings)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, settings: &VoiceSettings) -> Result<Vec<u8>, TtsError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((text.to_string(), settings.clone()));
        }
        match self.behavior {
            Behavior::Status(status) => Err(TtsError::Upstream {
                status,
                body: "mock upstream failure".to_string(),
            }),
            Behavior::Transport => Err(TtsError::Transport("connection refused".to_string())),
            Behavior::Echo | Behavior::Empty => Ok(Self::audio_for(text)),
        }
    }
}
