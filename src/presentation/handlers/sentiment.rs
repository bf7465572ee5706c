use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::application::ports::{CompletionRequest, LlmClient};
use crate::application::services::{build_direct_sentiment_prompt, strip_code_fence};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

use super::error::{error_response, llm_error_response};

#[derive(Debug, Deserialize)]
pub struct SentimentRequest {
    #[serde(default)]
    pub text: String,
}

/// Single-shot sentiment label with an explanation. The model's JSON is
/// passed through untouched.
#[tracing::instrument(skip(state, request))]
pub async fn sentiment_handler<L>(
    State(state): State<AppState<L>>,
    Json(request): Json<SentimentRequest>,
) -> impl IntoResponse
where
    L: LlmClient + 'static,
{
    if request.text.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Text content is required");
    }

    tracing::debug!(text = %sanitize_prompt(&request.text), "Processing sentiment request");

    let prompt = build_direct_sentiment_prompt(&request.text);
    let reply = match state
        .llm_client
        .complete(&CompletionRequest::from_prompt(prompt))
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(error = %e, "Sentiment completion failed");
            return llm_error_response(&e);
        }
    };

    match serde_json::from_str::<serde_json::Value>(&strip_code_fence(&reply)) {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, reply = %sanitize_prompt(&reply), "Unparseable sentiment reply");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to parse AI response")
        }
    }
}
