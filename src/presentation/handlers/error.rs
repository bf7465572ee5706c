use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::{LlmClientError, SessionStoreError};
use crate::application::services::{AnalysisError, ChatError, ExtractionWarning};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ExtractionWarning>,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            warnings: Vec::new(),
        }),
    )
        .into_response()
}

pub fn llm_error_response(error: &LlmClientError) -> Response {
    if error.is_configuration() {
        return error_response(StatusCode::BAD_REQUEST, error.to_string());
    }
    error_response(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
}

pub fn session_error_response(error: &SessionStoreError) -> Response {
    match error {
        SessionStoreError::NotFound(_) => error_response(StatusCode::NOT_FOUND, error.to_string()),
        SessionStoreError::StaleTicket(_) => {
            error_response(StatusCode::CONFLICT, error.to_string())
        }
    }
}

pub fn chat_error_response(error: &ChatError) -> Response {
    match error {
        ChatError::EmptyConversation | ChatError::EmptyMessage => {
            error_response(StatusCode::BAD_REQUEST, error.to_string())
        }
        ChatError::Completion(e) => llm_error_response(e),
        ChatError::Session(e) => session_error_response(e),
    }
}

pub fn analysis_error_response(error: AnalysisError) -> Response {
    match error {
        AnalysisError::NoText { warnings } => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "No text to analyze".to_string(),
                warnings,
            }),
        )
            .into_response(),
        AnalysisError::Completion(e) => llm_error_response(&e),
        AnalysisError::Interpretation(e) => error_response(StatusCode::BAD_GATEWAY, e.to_string()),
    }
}
