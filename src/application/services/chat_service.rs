use std::sync::Arc;

use futures::stream::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    CompletionRequest, InlineAttachment, LlmClient, LlmClientError, LlmTokenStream, SessionStore,
    SessionStoreError,
};
use crate::domain::{ChatMessage, SessionId};

use super::cancellable_stream::cancellable;

/// Appended to an assistant message whose stream ended with an upstream error.
pub const TRUNCATED_MARKER: &str = " [TRUNCATED]";

pub struct ChatService<L>
where
    L: LlmClient,
{
    llm_client: Arc<L>,
    session_store: Arc<dyn SessionStore>,
}

impl<L> ChatService<L>
where
    L: LlmClient,
{
    pub fn new(llm_client: Arc<L>, session_store: Arc<dyn SessionStore>) -> Self {
        Self {
            llm_client,
            session_store,
        }
    }

    pub async fn reply(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        validate_history(messages, false)?;

        self.llm_client
            .complete(&CompletionRequest::from_history(messages))
            .await
            .map_err(ChatError::Completion)
    }

    pub async fn reply_stream(
        &self,
        messages: &[ChatMessage],
        attachments: Vec<InlineAttachment>,
        cancel: CancellationToken,
    ) -> Result<LlmTokenStream, ChatError> {
        validate_history(messages, !attachments.is_empty())?;

        let request = CompletionRequest::from_history(messages).with_attachments(attachments);
        let stream = self
            .llm_client
            .complete_stream(&request)
            .await
            .map_err(ChatError::Completion)?;

        Ok(cancellable(stream, cancel))
    }

    /// Sends `content` as the next user turn of a stored session and streams
    /// the reply. The assistant message is recorded once the stream ends, is
    /// cancelled, or is dropped by the caller.
    #[tracing::instrument(skip(self, content, attachments, cancel), fields(session_id = %session_id))]
    pub async fn send_in_session(
        &self,
        session_id: SessionId,
        content: String,
        attachments: Vec<InlineAttachment>,
        cancel: CancellationToken,
    ) -> Result<LlmTokenStream, ChatError> {
        let session = self.session_store.get(session_id).await?;
        let user_message = ChatMessage::user(content);

        let mut history = session.messages().to_vec();
        history.push(user_message.clone());
        validate_history(&history, !attachments.is_empty())?;

        self.session_store
            .append_message(session_id, user_message)
            .await?;

        let stream = self.reply_stream(&history, attachments, cancel).await?;
        Ok(record_reply(
            stream,
            Arc::clone(&self.session_store),
            session_id,
        ))
    }
}

fn validate_history(messages: &[ChatMessage], has_attachments: bool) -> Result<(), ChatError> {
    let last = messages.last().ok_or(ChatError::EmptyConversation)?;
    if last.content.trim().is_empty() && !has_attachments {
        return Err(ChatError::EmptyMessage);
    }
    Ok(())
}

struct ReplyRecorder {
    store: Arc<dyn SessionStore>,
    session_id: SessionId,
    text: String,
    saved: bool,
}

impl ReplyRecorder {
    async fn save(&mut self, suffix: &str) {
        self.saved = true;
        let message = ChatMessage::assistant(format!("{}{}", self.text, suffix));
        if let Err(e) = self.store.append_message(self.session_id, message).await {
            tracing::error!(error = %e, session_id = %self.session_id, "Failed to record reply");
        }
    }
}

impl Drop for ReplyRecorder {
    fn drop(&mut self) {
        if self.saved || self.text.is_empty() {
            return;
        }

        let store = Arc::clone(&self.store);
        let session_id = self.session_id;
        let content = std::mem::take(&mut self.text);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tracing::debug!(session_id = %session_id, "Reply stream dropped, recording partial text");
            handle.spawn(async move {
                let _ = store
                    .append_message(session_id, ChatMessage::assistant(content))
                    .await;
            });
        }
    }
}

fn record_reply(
    stream: LlmTokenStream,
    store: Arc<dyn SessionStore>,
    session_id: SessionId,
) -> LlmTokenStream {
    Box::pin(async_stream::stream! {
        let mut stream = stream;
        let mut recorder = ReplyRecorder {
            store,
            session_id,
            text: String::new(),
            saved: false,
        };

        let mut truncated = false;

        while let Some(item) = stream.next().await {
            match item {
                Ok(chunk) => {
                    recorder.text.push_str(&chunk);
                    yield Ok(chunk);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Reply stream failed");
                    recorder.save(TRUNCATED_MARKER).await;
                    truncated = true;
                    yield Err(e);
                    break;
                }
            }
        }

        if !truncated {
            recorder.save("").await;
        }
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("No messages provided")]
    EmptyConversation,
    #[error("Empty message content")]
    EmptyMessage,
    #[error("completion: {0}")]
    Completion(LlmClientError),
    #[error(transparent)]
    Session(#[from] SessionStoreError),
}
