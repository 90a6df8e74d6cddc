//! Conversation history store trait and in-memory implementation.

mod memory;

pub use folio_types::{ChatMessage, HistoryError, HistoryStore};
pub use memory::{InMemoryHistoryStore, DEFAULT_MAX_RETAINED};
