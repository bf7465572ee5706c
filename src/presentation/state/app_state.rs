use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::ports::{FileLoader, LlmClient, SessionStore};
use crate::application::services::{
    AnalysisService, ChatService, ExtractionService, SentimentPromptBuilder,
};
use crate::domain::UploadPolicy;
use crate::presentation::config::Settings;

pub struct AppState<L>
where
    L: LlmClient,
{
    pub chat_service: Arc<ChatService<L>>,
    pub analysis_service: Arc<AnalysisService<L>>,
    pub llm_client: Arc<L>,
    pub session_store: Arc<dyn SessionStore>,
    pub upload_policy: UploadPolicy,
    pub settings: Settings,
    /// Cancelled on server shutdown; streaming handlers derive child tokens.
    pub shutdown: CancellationToken,
}

impl<L> AppState<L>
where
    L: LlmClient,
{
    /// Wires the services around one model client, file loader and store.
    pub fn new(
        llm_client: Arc<L>,
        file_loader: Arc<dyn FileLoader>,
        session_store: Arc<dyn SessionStore>,
        settings: Settings,
    ) -> Self {
        let upload_policy = settings.uploads.policy();
        let extraction_service = Arc::new(ExtractionService::new(
            file_loader,
            upload_policy.clone(),
        ));
        let analysis_service = Arc::new(AnalysisService::new(
            Arc::clone(&llm_client),
            extraction_service,
            SentimentPromptBuilder::new(settings.analysis.response_language.clone()),
        ));
        let chat_service = Arc::new(ChatService::new(
            Arc::clone(&llm_client),
            Arc::clone(&session_store),
        ));

        Self {
            chat_service,
            analysis_service,
            llm_client,
            session_store,
            upload_policy,
            settings,
            shutdown: CancellationToken::new(),
        }
    }
}

impl<L> Clone for AppState<L>
where
    L: LlmClient,
{
    fn clone(&self) -> Self {
        Self {
            chat_service: Arc::clone(&self.chat_service),
            analysis_service: Arc::clone(&self.analysis_service),
            llm_client: Arc::clone(&self.llm_client),
            session_store: Arc::clone(&self.session_store),
            upload_policy: self.upload_policy.clone(),
            settings: self.settings.clone(),
            shutdown: self.shutdown.clone(),
        }
    }
}
