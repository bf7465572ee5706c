use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::application::ports::{LlmClient, LlmTokenStream};
use crate::presentation::state::AppState;

use super::attachments::{FileData, build_attachments};
use super::chat::{MessageDto, to_chat_messages};
use super::error::{chat_error_response, error_response};

#[derive(Debug, Deserialize)]
pub struct StreamChatRequest {
    #[serde(default)]
    pub messages: Vec<MessageDto>,
    #[serde(default)]
    pub files: Vec<FileData>,
}

/// Sends model chunks to the client as they arrive. An upstream error after
/// the first chunk aborts the body, which the client sees as a truncated
/// response.
pub fn text_stream_response(stream: LlmTokenStream) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    )
        .into_response()
}

#[tracing::instrument(
    skip(state, request),
    fields(messages = request.messages.len(), files = request.files.len())
)]
pub async fn chat_stream_handler<L>(
    State(state): State<AppState<L>>,
    Json(request): Json<StreamChatRequest>,
) -> impl IntoResponse
where
    L: LlmClient + 'static,
{
    let messages = match to_chat_messages(request.messages) {
        Ok(messages) => messages,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    let attachments = match build_attachments(request.files, &state.upload_policy) {
        Ok(attachments) => attachments,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected chat attachments");
            return error_response(StatusCode::BAD_REQUEST, e);
        }
    };

    match state
        .chat_service
        .reply_stream(&messages, attachments, state.shutdown.child_token())
        .await
    {
        Ok(stream) => text_stream_response(stream),
        Err(e) => {
            tracing::error!(error = %e, "Failed to start chat stream");
            chat_error_response(&e)
        }
    }
}
