use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::LlmClient;
use crate::application::services::{
    AnalysisOutcome, AnalysisRequest, ExtractionWarning, UploadedFile,
};
use crate::domain::SentimentResult;
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

use super::error::{analysis_error_response, error_response, session_error_response};
use super::sessions::parse_session_id;

#[derive(Serialize)]
pub struct AnalysisResponse {
    pub result: SentimentResult,
    pub interpretation: &'static str,
    pub low_confidence: bool,
    pub warnings: Vec<ExtractionWarning>,
}

impl From<AnalysisOutcome> for AnalysisResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        Self {
            interpretation: outcome.interpretation.kind(),
            low_confidence: outcome.interpretation.is_low_confidence(),
            result: outcome.interpretation.into_result(),
            warnings: outcome.warnings,
        }
    }
}

#[derive(Serialize)]
pub struct AnalysisSlotResponse {
    pub result: Option<SentimentResult>,
}

/// Collects the `text` field and every `file` part of an analysis form.
async fn read_analysis_form(mut multipart: Multipart) -> Result<AnalysisRequest, Response> {
    let mut request = AnalysisRequest::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart");
                return Err(error_response(
                    e.status(),
                    format!("Failed to read multipart: {}", e),
                ));
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);

        match (name.as_str(), filename) {
            ("text", None) => {
                let text = field.text().await.map_err(|e| {
                    error_response(e.status(), format!("Failed to read text: {}", e))
                })?;
                if !request.text.is_empty() {
                    request.text.push_str("\n\n");
                }
                request.text.push_str(&text);
            }
            (_, Some(filename)) => {
                let data = field.bytes().await.map_err(|e| {
                    error_response(e.status(), format!("Failed to read file: {}", e))
                })?;
                tracing::debug!(filename = %filename, bytes = data.len(), "File received");
                request.files.push(UploadedFile::new(filename, data));
            }
            (other, None) => {
                tracing::debug!(field = %other, "Ignoring unknown form field");
            }
        }
    }

    Ok(request)
}

#[tracing::instrument(skip(state, multipart))]
pub async fn analysis_handler<L>(
    State(state): State<AppState<L>>,
    multipart: Multipart,
) -> impl IntoResponse
where
    L: LlmClient + 'static,
{
    let request = match read_analysis_form(multipart).await {
        Ok(request) => request,
        Err(response) => return response,
    };
    tracing::debug!(
        text = %sanitize_prompt(&request.text),
        files = request.files.len(),
        "Processing analysis request"
    );

    match state.analysis_service.analyze(request).await {
        Ok(outcome) => (StatusCode::OK, Json(AnalysisResponse::from(outcome))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Analysis failed");
            analysis_error_response(e)
        }
    }
}

/// Runs an analysis for a session. Only the most recently started analysis
/// may fill the session's result slot; an overtaken one gets `409`.
#[tracing::instrument(skip(state, multipart))]
pub async fn session_analysis_handler<L>(
    State(state): State<AppState<L>>,
    Path(session_id): Path<String>,
    multipart: Multipart,
) -> impl IntoResponse
where
    L: LlmClient + 'static,
{
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let request = match read_analysis_form(multipart).await {
        Ok(request) => request,
        Err(response) => return response,
    };

    let ticket = match state.session_store.begin_analysis(session_id).await {
        Ok(ticket) => ticket,
        Err(e) => return session_error_response(&e),
    };

    let outcome = match state.analysis_service.analyze(request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, ticket = ticket.value(), "Session analysis failed");
            return analysis_error_response(e);
        }
    };

    let response = AnalysisResponse::from(outcome);
    if let Err(e) = state
        .session_store
        .commit_analysis(session_id, ticket, response.result.clone())
        .await
    {
        tracing::warn!(error = %e, ticket = ticket.value(), "Discarding analysis result");
        return session_error_response(&e);
    }

    (StatusCode::OK, Json(response)).into_response()
}

#[tracing::instrument(skip(state))]
pub async fn get_session_analysis_handler<L>(
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
            Json(AnalysisSlotResponse {
                result: session.analysis().current().cloned(),
            }),
        )
            .into_response(),
        Err(e) => session_error_response(&e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn clear_session_analysis_handler<L>(
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

    match state.session_store.clear_analysis(session_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => session_error_response(&e),
    }
}
