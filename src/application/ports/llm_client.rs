use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::Stream;

use crate::domain::{ChatMessage, MessageRole};

/// Lazy, finite, non-restartable sequence of text chunks from the model.
pub type LlmTokenStream = Pin<Box<dyn Stream<Item = Result<String, LlmClientError>> + Send>>;

/// File content sent alongside a prompt, already base64 encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineAttachment {
    pub name: String,
    pub mime_type: String,
    pub data_base64: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionTurn {
    pub role: MessageRole,
    pub text: String,
}

/// What the gateway sends upstream: an ordered history plus attachments that
/// belong to the last user turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionRequest {
    pub turns: Vec<CompletionTurn>,
    pub attachments: Vec<InlineAttachment>,
}

impl CompletionRequest {
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            turns: vec![CompletionTurn {
                role: MessageRole::User,
                text: prompt.into(),
            }],
            attachments: Vec::new(),
        }
    }

    pub fn from_history(messages: &[ChatMessage]) -> Self {
        Self {
            turns: messages
                .iter()
                .map(|m| CompletionTurn {
                    role: m.role,
                    text: m.content.clone(),
                })
                .collect(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<InlineAttachment>) -> Self {
        self.attachments = attachments;
        self
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmClientError>;

    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<LlmTokenStream, LlmClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    #[error("API key not configured")]
    MissingApiKey,
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("empty response from model")]
    EmptyResponse,
}

impl LlmClientError {
    /// Configuration problems are the caller's to fix; everything else is upstream.
    pub fn is_configuration(&self) -> bool {
        matches!(self, LlmClientError::MissingApiKey)
    }
}
