//! HTTP client for the LangVoice text-to-speech API.

use async_trait::async_trait;
use folio_types::{SpeechSynthesizer, TtsError, VoiceSettings};
use serde::Serialize;
use std::fmt;

pub const DEFAULT_LANGVOICE_BASE: &str = "https://www.langvoice.pro/api";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    text: &'a str,
    voice: &'a str,
    language: &'a str,
    speed: f32,
}

/// Synthesizer that posts to `<base>/tts/generate` with an `X-API-Key` header.
pub struct LangVoiceClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl LangVoiceClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Build from `LANGVOICE_API_KEY` (or `NEXT_PUBLIC_LANGVOICE_API_KEY`) and
    /// `LANGVOICE_API_BASE`. Returns `None` when no key is set.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("LANGVOICE_API_KEY")
            .or_else(|_| std::env::var("NEXT_PUBLIC_LANGVOICE_API_KEY"))
            .ok()
            .filter(|k| !k.is_empty())?;
        let base_url = std::env::var("LANGVOICE_API_BASE")
            .unwrap_or_else(|_| DEFAULT_LANGVOICE_BASE.to_string());
        Some(Self::new(base_url, api_key))
    }

    fn generate_url(&self) -> String {
        format!("{}/tts/generate", self.base_url)
    }
}

impl fmt::Debug for LangVoiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LangVoiceClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl SpeechSynthesizer for LangVoiceClient {
    async fn synthesize(&self, text: &str, settings: &VoiceSettings) -> Result<Vec<u8>, TtsError> {
        let body = GenerateRequest {
            text,
            voice: &settings.voice,
            language: &settings.language,
            speed: settings.speed,
        };
        let res = self
            .client
            .post(self.generate_url())
            .header("X-API-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TtsError::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(TtsError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let audio = res
            .bytes()
            .await
            .map_err(|e| TtsError::Transport(e.to_string()))?;
        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api/", addr)
    }

    #[tokio::test]
    async fn posts_voice_settings_with_api_key() {
        let router = Router::new().route(
            "/api/tts/generate",
            post(
                |headers: axum::http::HeaderMap, Json(body): Json<serde_json::Value>| async move {
                    assert_eq!(headers.get("x-api-key").unwrap().to_str().unwrap(), "lv-key");
                    assert_eq!(body["text"], "halo");
                    assert_eq!(body["voice"], "heart");
                    assert_eq!(body["language"], "american_english");
                    assert_eq!(body["speed"], 1.0);
                    vec![0xffu8, 0xfb, 0x90, 0x00]
                },
            ),
        );
        let base = spawn(router).await;
        let client = LangVoiceClient::new(base, "lv-key");
        let audio = client
            .synthesize("halo", &VoiceSettings::default())
            .await
            .unwrap();
        assert_eq!(audio, vec![0xff, 0xfb, 0x90, 0x00]);
    }

    #[tokio::test]
    async fn upstream_failure_carries_status_and_body() {
        let router = Router::new().route(
            "/api/tts/generate",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let base = spawn(router).await;
        let client = LangVoiceClient::new(base, "wrong");
        let err = client
            .synthesize("halo", &VoiceSettings::default())
            .await
            .unwrap_err();
        match err {
            TtsError::Upstream { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
