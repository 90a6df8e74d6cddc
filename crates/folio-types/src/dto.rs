//! Request and response DTOs for the chat and TTS proxy endpoints.

use serde::{Deserialize, Serialize};

/// Header carrying the caller's conversation session id.
pub const SESSION_HEADER: &str = "x-session-id";

/// Session id used when a request carries no session header.
pub const DEFAULT_SESSION_ID: &str = "default";

pub const DEFAULT_VOICE: &str = "heart";
pub const DEFAULT_LANGUAGE: &str = "american_english";
pub const DEFAULT_SPEED: f32 = 1.0;

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single chat turn (role + content), OpenAI-compatible on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    /// The message when present and non-empty.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}

/// Successful reply of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// Reply of `GET /api/chat`: the caller's stored turns, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistoryResponse {
    pub history: Vec<ChatMessage>,
}

/// Reply of `DELETE /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearResponse {
    pub success: bool,
}

/// JSON error envelope used by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Voice parameters forwarded to the TTS API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub voice: String,
    pub language: String,
    pub speed: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            voice: DEFAULT_VOICE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            speed: DEFAULT_SPEED,
        }
    }
}

/// Body of `POST /api/langvoice/tts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TtsRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

impl TtsRequest {
    pub fn new(text: impl Into<String>, settings: &VoiceSettings) -> Self {
        Self {
            text: Some(text.into()),
            voice: Some(settings.voice.clone()),
            language: Some(settings.language.clone()),
            speed: Some(settings.speed),
        }
    }

    /// The text when present and non-empty.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// Voice settings with defaults filled in for absent fields.
    pub fn settings(&self) -> VoiceSettings {
        let defaults = VoiceSettings::default();
        VoiceSettings {
            voice: self.voice.clone().unwrap_or(defaults.voice),
            language: self.language.clone().unwrap_or(defaults.language),
            speed: self.speed.unwrap_or(defaults.speed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_treats_empty_as_missing() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": ""}"#).unwrap();
        assert_eq!(req.message(), None);
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.message(), None);
        let req: ChatRequest = serde_json::from_str(r#"{"message": null}"#).unwrap();
        assert_eq!(req.message(), None);
        let req: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(req.message(), Some("hi"));
    }

    #[test]
    fn tts_request_fills_voice_defaults() {
        let req: TtsRequest = serde_json::from_str(r#"{"text": "halo", "speed": 1.25}"#).unwrap();
        let settings = req.settings();
        assert_eq!(settings.voice, "heart");
        assert_eq!(settings.language, "american_english");
        assert_eq!(settings.speed, 1.25);
    }

    #[test]
    fn roles_serialize_lowercase() {
        let msg = ChatMessage::assistant("ok");
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["role"], "assistant");
        assert_eq!(v["content"], "ok");
    }
}
