use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::ports::LlmClient;
use crate::domain::{ChatMessage, SessionId};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

use super::attachments::{FileData, build_attachments};
use super::chat_stream::text_stream_response;
use super::error::{chat_error_response, error_response, session_error_response};

#[derive(Serialize)]
pub struct CreateSessionResponse {
    pub session_id: SessionId,
}

#[derive(Serialize)]
pub struct MessagesResponse {
    pub session_id: SessionId,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub files: Vec<FileData>,
}

/// Malformed ids cannot name a session, so they are reported as not found.
pub fn parse_session_id(raw: &str) -> Result<SessionId, Response> {
    raw.parse::<SessionId>().map_err(|_| {
        tracing::warn!(session_id = %raw, "Malformed session id");
        error_response(StatusCode::NOT_FOUND, format!("session not found: {raw}"))
    })
}

#[tracing::instrument(skip(state))]
pub async fn create_session_handler<L>(State(state): State<AppState<L>>) -> impl IntoResponse
where
    L: LlmClient + 'static,
{
    match state.session_store.create().await {
        Ok(session) => {
            tracing::info!(session_id = %session.id, "Session created");
            (
                StatusCode::CREATED,
                Json(CreateSessionResponse {
                    session_id: session.id,
                }),
            )
                .into_response()
        }
        Err(e) => session_error_response(&e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn delete_session_handler<L>(
    State(state): State<AppState<L>>,
    Path(session_id): Path<String>,
) -> impl IntoResponse
where
    L: LlmClient + 'static,
{
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.session_store.delete(session_id).await {
        Ok(()) => {
            tracing::info!(session_id = %session_id, "Session deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => session_error_response(&e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn list_messages_handler<L>(
    State(state): State<AppState<L>>,
    Path(session_id): Path<String>,
) -> impl IntoResponse
where
    L: LlmClient + 'static,
{
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.session_store.get(session_id).await {
        Ok(session) => (
            StatusCode::OK,
            Json(MessagesResponse {
                session_id,
                messages: session.messages().to_vec(),
            }),
        )
            .into_response(),
        Err(e) => session_error_response(&e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn clear_messages_handler<L>(
    State(state): State<AppState<L>>,
    Path(session_id): Path<String>,
) -> impl IntoResponse
where
    L: LlmClient + 'static,
{
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.session_store.clear_history(session_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => session_error_response(&e),
    }
}

#[tracing::instrument(skip(state, request), fields(files = request.files.len()))]
pub async fn send_message_handler<L>(
    State(state): State<AppState<L>>,
    Path(session_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> impl IntoResponse
where
    L: LlmClient + 'static,
{
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let attachments = match build_attachments(request.files, &state.upload_policy) {
        Ok(attachments) => attachments,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    tracing::debug!(prompt = %sanitize_prompt(&request.content), "Processing session message");

    match state
        .chat_service
        .send_in_session(
            session_id,
            request.content,
            attachments,
            state.shutdown.child_token(),
        )
        .await
    {
        Ok(stream) => text_stream_response(stream),
        Err(e) => {
            tracing::error!(error = %e, "Failed to start session reply");
            chat_error_response(&e)
        }
    }
}
