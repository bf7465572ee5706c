use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::application::ports::LlmClient;
use crate::domain::{ChatMessage, MessageRole};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

use super::error::{chat_error_response, error_response};

#[derive(Debug, Clone, Deserialize)]
pub struct MessageDto {
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

fn default_role() -> String {
    MessageRole::User.as_str().to_string()
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<MessageDto>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub message: String,
}

/// Converts wire messages into domain messages, rejecting unknown roles.
pub fn to_chat_messages(messages: Vec<MessageDto>) -> Result<Vec<ChatMessage>, String> {
    messages
        .into_iter()
        .map(|m| {
            let role = m.role.parse::<MessageRole>()?;
            Ok(ChatMessage::new(role, m.content))
        })
        .collect()
}

#[tracing::instrument(skip(state, request), fields(messages = request.messages.len()))]
pub async fn chat_handler<L>(
    State(state): State<AppState<L>>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse
where
    L: LlmClient + 'static,
{
    let messages = match to_chat_messages(request.messages) {
        Ok(messages) => messages,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected chat request");
            return error_response(StatusCode::BAD_REQUEST, e);
        }
    };

    if let Some(last) = messages.last() {
        tracing::debug!(prompt = %sanitize_prompt(&last.content), "Processing chat request");
    }

    match state.chat_service.reply(&messages).await {
        Ok(message) => {
            tracing::info!(chars = message.len(), "Chat reply generated");
            (StatusCode::OK, Json(ChatResponse { message })).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Chat request failed");
            chat_error_response(&e)
        }
    }
}
