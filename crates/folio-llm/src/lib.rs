//! Upstream clients: Groq chat completion and LangVoice text-to-speech.

mod groq;
mod langvoice;
#[cfg(feature = "test-util")]
pub mod mock;
mod retry;

pub use folio_types::{ChatCompleter, ChatError, SpeechSynthesizer, TtsError};
pub use groq::{GroqChatClient, DEFAULT_CHAT_MODEL, DEFAULT_CHAT_URL, SYSTEM_PROMPT};
pub use langvoice::{LangVoiceClient, DEFAULT_LANGVOICE_BASE};
pub use retry::{retry_with_backoff, RetryPolicy};

#[cfg(feature = "test-util")]
pub use mock::{MockChatCompleter, MockSynthesizer};
