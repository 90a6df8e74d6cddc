//! Conversation backend that talks to the portfolio proxy endpoints.

use crate::capability::{ConversationBackend, VoiceError};
use async_trait::async_trait;
use folio_types::{ChatReply, ChatRequest, TtsRequest, VoiceSettings, SESSION_HEADER};
use std::fmt;

/// Calls `POST /api/chat` and `POST /api/langvoice/tts` on `base_url`, tagging
/// every request with this backend's session id.
pub struct ProxyBackend {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl ProxyBackend {
    /// New backend with a fresh random session id.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_session(base_url, uuid::Uuid::new_v4().to_string())
    }

    pub fn with_session(base_url: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Drop this session's server-side history (`DELETE /api/chat`).
    pub async fn clear_history(&self) -> Result<(), VoiceError> {
        let res = self
            .client
            .delete(format!("{}/api/chat", self.base_url))
            .header(SESSION_HEADER, &self.session_id)
            .send()
            .await
            .map_err(|e| VoiceError::Transport(e.to_string()))?;
        if !res.status().is_success() {
            return Err(VoiceError::Status {
                endpoint: "Chat",
                status: res.status().as_u16(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for ProxyBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyBackend")
            .field("base_url", &self.base_url)
            .field("session_id", &self.session_id)
            .finish()
    }
}

#[async_trait]
impl ConversationBackend for ProxyBackend {
    async fn chat(&self, message: &str) -> Result<String, VoiceError> {
        tracing::debug!(session = %self.session_id, "sending message to chat endpoint");
        let res = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .header(SESSION_HEADER, &self.session_id)
            .json(&ChatRequest {
                message: Some(message.to_string()),
            })
            .send()
            .await
            .map_err(|e| VoiceError::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "chat endpoint error");
            return Err(VoiceError::Status {
                endpoint: "Chat",
                status: status.as_u16(),
            });
        }

        let reply: ChatReply = res
            .json()
            .await
            .map_err(|e| VoiceError::Decode(e.to_string()))?;
        Ok(reply.response)
    }

    async fn synthesize(&self, text: &str, settings: &VoiceSettings) -> Result<Vec<u8>, VoiceError> {
        let res = self
            .client
            .post(format!("{}/api/langvoice/tts", self.base_url))
            .header(SESSION_HEADER, &self.session_id)
            .json(&TtsRequest::new(text, settings))
            .send()
            .await
            .map_err(|e| VoiceError::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(VoiceError::Status {
                endpoint: "LangVoice",
                status: status.as_u16(),
            });
        }
        let audio = res
            .bytes()
            .await
            .map_err(|e| VoiceError::Transport(e.to_string()))?;
        Ok(audio.to_vec())
    }
}
