//! Voice conversation engine.
//!
//! Coordinates a host speech recognizer, the chat and TTS proxy endpoints, and
//! host audio playback as one session. Host-specific pieces (microphone,
//! speakers) plug in through [`SpeechRecognizer`] and [`AudioPlayer`].

mod capability;
mod conversation;
mod proxy;

pub use capability::{
    AudioPlayer, ConversationBackend, ConversationListener, MessageSource, NoopListener,
    PlaybackError, RecognizerError, SpeechRecognizer, VoiceError,
};
pub use conversation::{
    ConversationConfig, ConversationStatus, VoiceConversation, CHAT_FALLBACK_REPLY,
    DEFAULT_WELCOME_MESSAGE,
};
pub use folio_types::VoiceSettings;
pub use proxy::ProxyBackend;
