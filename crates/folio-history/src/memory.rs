//! In-memory history store: one turn list per session id.

use chrono::{DateTime, Utc};
use folio_types::{ChatMessage, HistoryError, HistoryStore};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Turns kept per session before the oldest are dropped.
pub const DEFAULT_MAX_RETAINED: usize = 100;

struct Session {
    turns: VecDeque<ChatMessage>,
    last_touched: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        Self {
            turns: VecDeque::new(),
            last_touched: Utc::now(),
        }
    }
}

/// In-memory HistoryStore (process lifetime only).
pub struct InMemoryHistoryStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    max_retained: usize,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::with_max_retained(DEFAULT_MAX_RETAINED)
    }

    pub fn with_max_retained(max_retained: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_retained: max_retained.max(1),
        }
    }

    #[cfg(test)]
    async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Remove sessions last touched before `cutoff`.
    pub async fn purge_touched_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut guard = self.sessions.write().await;
        let before = guard.len();
        guard.retain(|_, s| s.last_touched >= cutoff);
        before - guard.len()
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, session_id: &str, message: ChatMessage) -> Result<(), HistoryError> {
        let mut guard = self.sessions.write().await;
        let session = guard
            .entry(session_id.to_string())
            .or_insert_with(Session::new);
        session.turns.push_back(message);
        while session.turns.len() > self.max_retained {
            session.turns.pop_front();
        }
        session.last_touched = Utc::now();
        Ok(())
    }

    async fn recent(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, HistoryError> {
        let guard = self.sessions.read().await;
        let Some(session) = guard.get(session_id) else {
            return Ok(Vec::new());
        };
        let skip = session.turns.len().saturating_sub(limit);
        Ok(session.turns.iter().skip(skip).cloned().collect())
    }

    async fn history(&self, session_id: &str) -> Result<Vec<ChatMessage>, HistoryError> {
        let guard = self.sessions.read().await;
        Ok(guard
            .get(session_id)
            .map(|s| s.turns.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn clear(&self, session_id: &str) -> Result<(), HistoryError> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }

    async fn purge_idle(&self, max_idle: Duration) -> Result<usize, HistoryError> {
        let max_idle =
            chrono::Duration::from_std(max_idle).map_err(|e| HistoryError::Other(e.to_string()))?;
        let removed = self.purge_touched_before(Utc::now() - max_idle).await;
        if removed > 0 {
            tracing::debug!(removed, "purged idle chat sessions");
        }
        Ok(removed)
    }
}
