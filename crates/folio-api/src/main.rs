//! Portfolio assistant proxy server: /api/chat, /api/langvoice/tts.

use folio_api::config::ServerConfig;
use folio_api::server::{self, AppState};
use folio_history::InMemoryHistoryStore;
use folio_llm::{GroqChatClient, LangVoiceClient};
use folio_types::{ChatCompleter, HistoryStore, SpeechSynthesizer};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    let chat = GroqChatClient::from_env();
    let tts = LangVoiceClient::from_env();
    tracing::info!(
        chat_key_present = chat.is_some(),
        tts_key_present = tts.is_some(),
        history_window = config.history_window,
        "upstream clients configured"
    );

    let history: Arc<dyn HistoryStore + Send + Sync> = Arc::new(InMemoryHistoryStore::new());
    let state = Arc::new(AppState {
        chat: chat.map(|c| Arc::new(c) as Arc<dyn ChatCompleter + Send + Sync>),
        tts: tts.map(|t| Arc::new(t) as Arc<dyn SpeechSynthesizer + Send + Sync>),
        history: Arc::clone(&history),
        system_prompt: config.system_prompt.clone(),
        history_window: config.history_window,
    });
    let _sweeper = server::spawn_idle_sweeper(history, config.session_idle);

    let app = server::router(state);
    tracing::info!("portfolio API listening on {}", config.listen);
    axum::serve(
        tokio::net::TcpListener::bind(config.listen).await?,
        app.into_make_service(),
    )
    .await?;
    Ok(())
}
