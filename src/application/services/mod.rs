mod analysis_service;
mod cancellable_stream;
mod chat_service;
mod extraction_service;
mod prompt_builder;
mod response_interpreter;
mod title_heuristic;

pub use analysis_service::{AnalysisError, AnalysisOutcome, AnalysisRequest, AnalysisService};
pub use cancellable_stream::cancellable;
pub use chat_service::{ChatError, ChatService, TRUNCATED_MARKER};
pub use extraction_service::{
    ExtractedDocument, ExtractionBatch, ExtractionService, ExtractionWarning, UploadedFile,
    combine_text,
};
pub use prompt_builder::{
    DEFAULT_RESPONSE_LANGUAGE, SentimentPromptBuilder, build_direct_sentiment_prompt,
};
pub use response_interpreter::{
    DEFAULT_EMOTION, DEFAULT_SCORE, DEFAULT_TITLE, DistributionSource, InterpretError,
    Interpretation, RecoveryReport, SummarySource, interpret, strip_code_fence,
};
pub use title_heuristic::{UNTITLED, guess_title};
