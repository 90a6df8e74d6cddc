//! ProxyBackend against a live in-process proxy server backed by mocks.

use folio_api::server::{self, AppState};
use folio_history::InMemoryHistoryStore;
use folio_llm::{MockChatCompleter, MockSynthesizer};
use folio_types::{ChatCompleter, HistoryStore, SpeechSynthesizer, VoiceSettings};
use folio_voice::{ConversationBackend, ProxyBackend, VoiceError};
use std::sync::Arc;

async fn spawn_proxy(
    chat: MockChatCompleter,
    tts: MockSynthesizer,
) -> (String, Arc<InMemoryHistoryStore>) {
    let history = Arc::new(InMemoryHistoryStore::new());
    let state = Arc::new(AppState {
        chat: Some(Arc::new(chat) as Arc<dyn ChatCompleter + Send + Sync>),
        tts: Some(Arc::new(tts) as Arc<dyn SpeechSynthesizer + Send + Sync>),
        history: Arc::clone(&history) as Arc<dyn HistoryStore + Send + Sync>,
        system_prompt: "persona".to_string(),
        history_window: server::DEFAULT_HISTORY_WINDOW,
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, server::router(state)).await.unwrap();
    });
    (format!("http://{}", addr), history)
}

#[tokio::test]
async fn chat_and_speech_round_trip_through_proxy() {
    let (base, history) = spawn_proxy(MockChatCompleter::new(), MockSynthesizer::new()).await;
    let backend = ProxyBackend::with_session(&base, "visitor-1");

    let reply = backend.chat("halo").await.unwrap();
    assert_eq!(reply, "echo: halo");

    let audio = backend
        .synthesize(&reply, &VoiceSettings::default())
        .await
        .unwrap();
    assert_eq!(audio, MockSynthesizer::audio_for("echo: halo"));

    let stored = history.history("visitor-1").await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(history.history("default").await.unwrap().is_empty());

    backend.clear_history().await.unwrap();
    assert!(history.history("visitor-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn each_backend_gets_its_own_session() {
    let a = ProxyBackend::new("http://localhost:3000");
    let b = ProxyBackend::new("http://localhost:3000/");
    assert_ne!(a.session_id(), b.session_id());
}

#[tokio::test]
async fn proxy_errors_surface_as_status_errors() {
    let (base, _) = spawn_proxy(
        MockChatCompleter::failing_with(503),
        MockSynthesizer::failing_with(401),
    )
    .await;
    let backend = ProxyBackend::new(base);

    match backend.chat("halo").await.unwrap_err() {
        VoiceError::Status { status, .. } => assert_eq!(status, 503),
        other => panic!("unexpected error: {other:?}"),
    }
    match backend
        .synthesize("halo", &VoiceSettings::default())
        .await
        .unwrap_err()
    {
        VoiceError::Status { endpoint, status } => {
            assert_eq!(endpoint, "LangVoice");
            assert_eq!(status, 401);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
