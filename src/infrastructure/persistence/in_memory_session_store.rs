use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::application::ports::{SessionStore, SessionStoreError};
use crate::domain::{ChatMessage, ChatSession, RequestTicket, SentimentResult, SessionId};

pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Default)]
struct Sessions {
    by_id: HashMap<SessionId, ChatSession>,
    /// Creation order, oldest first.
    order: VecDeque<SessionId>,
}

/// Process-local session storage. Sessions vanish on restart.
///
/// At most `max_sessions` are kept; creating one more evicts the oldest.
pub struct InMemorySessionStore {
    sessions: RwLock<Sessions>,
    max_sessions: usize,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::with_max_sessions(DEFAULT_MAX_SESSIONS)
    }
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_sessions(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(Sessions::default()),
            max_sessions: max_sessions.max(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn with_session<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut ChatSession) -> T,
    ) -> Result<T, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .by_id
            .get_mut(&id)
            .ok_or(SessionStoreError::NotFound(id))?;
        Ok(f(session))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    #[instrument(skip(self))]
    async fn create(&self) -> Result<ChatSession, SessionStoreError> {
        let session = ChatSession::new();
        let mut sessions = self.sessions.write().await;

        while sessions.by_id.len() >= self.max_sessions {
            let Some(oldest) = sessions.order.pop_front() else {
                break;
            };
            if sessions.by_id.remove(&oldest).is_some() {
                tracing::info!(session_id = %oldest, "Evicted oldest session");
            }
        }

        sessions.by_id.insert(session.id, session.clone());
        sessions.order.push_back(session.id);
        tracing::debug!(session_id = %session.id, total = sessions.by_id.len(), "Session created");
        Ok(session)
    }

    async fn get(&self, id: SessionId) -> Result<ChatSession, SessionStoreError> {
        self.sessions
            .read()
            .await
            .by_id
            .get(&id)
            .cloned()
            .ok_or(SessionStoreError::NotFound(id))
    }

    #[instrument(skip(self, message), fields(session_id = %id, message_id = %message.id, role = %message.role))]
    async fn append_message(
        &self,
        id: SessionId,
        message: ChatMessage,
    ) -> Result<(), SessionStoreError> {
        self.with_session(id, |session| session.append(message))
            .await
    }

    #[instrument(skip(self), fields(session_id = %id))]
    async fn clear_history(&self, id: SessionId) -> Result<(), SessionStoreError> {
        self.with_session(id, ChatSession::clear_history).await
    }

    #[instrument(skip(self), fields(session_id = %id))]
    async fn begin_analysis(&self, id: SessionId) -> Result<RequestTicket, SessionStoreError> {
        self.with_session(id, |session| session.analysis_mut().issue_ticket())
            .await
    }

    #[instrument(skip(self, result), fields(session_id = %id, ticket = ticket.value()))]
    async fn commit_analysis(
        &self,
        id: SessionId,
        ticket: RequestTicket,
        result: SentimentResult,
    ) -> Result<(), SessionStoreError> {
        let committed = self
            .with_session(id, |session| session.analysis_mut().commit(ticket, result))
            .await?;

        if committed {
            Ok(())
        } else {
            tracing::warn!("Discarding stale analysis result");
            Err(SessionStoreError::StaleTicket(ticket.value()))
        }
    }

    #[instrument(skip(self), fields(session_id = %id))]
    async fn clear_analysis(&self, id: SessionId) -> Result<(), SessionStoreError> {
        self.with_session(id, |session| session.analysis_mut().clear())
            .await
    }

    #[instrument(skip(self), fields(session_id = %id))]
    async fn delete(&self, id: SessionId) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        sessions
            .by_id
            .remove(&id)
            .ok_or(SessionStoreError::NotFound(id))?;
        sessions.order.retain(|existing| *existing != id);
        tracing::debug!(remaining = sessions.by_id.len(), "Session deleted");
        Ok(())
    }
}
