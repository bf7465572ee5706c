use async_trait::async_trait;

use crate::domain::{ChatMessage, ChatSession, RequestTicket, SentimentResult, SessionId};

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self) -> Result<ChatSession, SessionStoreError>;

    async fn get(&self, id: SessionId) -> Result<ChatSession, SessionStoreError>;

    async fn append_message(
        &self,
        id: SessionId,
        message: ChatMessage,
    ) -> Result<(), SessionStoreError>;

    async fn clear_history(&self, id: SessionId) -> Result<(), SessionStoreError>;

    async fn begin_analysis(&self, id: SessionId) -> Result<RequestTicket, SessionStoreError>;

    /// Fails with [`SessionStoreError::StaleTicket`] when a newer analysis was
    /// started (or the slot cleared) after `ticket` was issued.
    async fn commit_analysis(
        &self,
        id: SessionId,
        ticket: RequestTicket,
        result: SentimentResult,
    ) -> Result<(), SessionStoreError>;

    async fn clear_analysis(&self, id: SessionId) -> Result<(), SessionStoreError>;

    /// Drops the session with its history and analysis slot.
    async fn delete(&self, id: SessionId) -> Result<(), SessionStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session not found: {0}")]
    NotFound(SessionId),
    #[error("analysis superseded: ticket {0} is no longer current")]
    StaleTicket(u64),
}
