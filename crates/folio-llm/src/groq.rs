//! HTTP client for the Groq (OpenAI-compatible) chat completion API.

use crate::retry::{retry_with_backoff, RetryPolicy};
use async_trait::async_trait;
use folio_types::{ChatCompleter, ChatError, ChatMessage};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.3-70b-versatile";

/// Persona prompt sent as the first message of every completion.
pub const SYSTEM_PROMPT: &str = include_str!("../prompts/system.md");

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Chat completer that calls Groq with bearer auth.
///
/// Transport failures are retried per `RetryPolicy`; non-2xx responses are
/// returned as [`ChatError::Upstream`] without retrying.
pub struct GroqChatClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    retry: RetryPolicy,
}

impl GroqChatClient {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.7,
            max_tokens: 150,
            top_p: 0.95,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build from `GROQ_API_KEY`, `GROQ_API_URL`, `GROQ_MODEL`. Returns `None`
    /// when no API key is set.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GROQ_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())?;
        let api_url = std::env::var("GROQ_API_URL").unwrap_or_else(|_| DEFAULT_CHAT_URL.to_string());
        let model = std::env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string());
        Some(Self::new(api_url, api_key, model))
    }
}

impl fmt::Debug for GroqChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqChatClient")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("retry", &self.retry)
            .finish()
    }
}

#[async_trait]
impl ChatCompleter for GroqChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Option<String>, ChatError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
        };

        let response = retry_with_backoff(&self.retry, || {
            self.client
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
        })
        .await
        .map_err(|e| ChatError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Parse(e.to_string()))?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty()))
    }
}
