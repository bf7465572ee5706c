use std::sync::Arc;

use crate::application::ports::{CompletionRequest, LlmClient, LlmClientError};

use super::extraction_service::{
    ExtractionService, ExtractionWarning, UploadedFile, combine_text,
};
use super::prompt_builder::SentimentPromptBuilder;
use super::response_interpreter::{InterpretError, Interpretation, interpret};
use super::title_heuristic::guess_title;

#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub text: String,
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub interpretation: Interpretation,
    pub warnings: Vec<ExtractionWarning>,
}

pub struct AnalysisService<L>
where
    L: LlmClient,
{
    llm_client: Arc<L>,
    extraction_service: Arc<ExtractionService>,
    prompt_builder: SentimentPromptBuilder,
}

impl<L> AnalysisService<L>
where
    L: LlmClient,
{
    pub fn new(
        llm_client: Arc<L>,
        extraction_service: Arc<ExtractionService>,
        prompt_builder: SentimentPromptBuilder,
    ) -> Self {
        Self {
            llm_client,
            extraction_service,
            prompt_builder,
        }
    }

    #[tracing::instrument(skip(self, request), fields(files = request.files.len()))]
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisOutcome, AnalysisError> {
        let batch = self.extraction_service.extract_all(&request.files).await;
        let full_text = combine_text(&request.text, &batch.documents);

        if full_text.is_empty() {
            tracing::warn!(warnings = batch.warnings.len(), "Nothing to analyze");
            return Err(AnalysisError::NoText {
                warnings: batch.warnings,
            });
        }

        let title_guess = guess_title(&full_text);
        let prompt = self.prompt_builder.build(&full_text);
        tracing::debug!(
            title = %title_guess,
            chars = full_text.chars().count(),
            documents = batch.documents.len(),
            "Requesting sentiment analysis"
        );

        let reply = self
            .llm_client
            .complete(&CompletionRequest::from_prompt(prompt))
            .await
            .map_err(AnalysisError::Completion)?;

        let interpretation = interpret(&reply, &title_guess)?;
        tracing::info!(
            interpretation = interpretation.kind(),
            low_confidence = interpretation.is_low_confidence(),
            sentiment = %interpretation.result().sentiment,
            "Sentiment analysis complete"
        );

        Ok(AnalysisOutcome {
            interpretation,
            warnings: batch.warnings,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("No text to analyze")]
    NoText { warnings: Vec<ExtractionWarning> },
    #[error("completion: {0}")]
    Completion(LlmClientError),
    #[error(transparent)]
    Interpretation(#[from] InterpretError),
}
