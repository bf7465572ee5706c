use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pdf_oxide::PdfDocument;
use tokio::sync::Mutex;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{Document, DocumentFormat};

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);
pub const MAX_INIT_ATTEMPTS: u32 = 3;

/// The engine that reads the text layer of a PDF.
pub trait PdfBackend: Send + Sync + 'static {
    /// Called once before the first extraction, and again after a failure
    /// until the attempt limit is reached.
    fn initialize(&self) -> Result<(), String>;

    /// Text of every page, in page order. Blocking.
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, FileLoaderError>;
}

pub struct PdfOxideBackend;

impl PdfBackend for PdfOxideBackend {
    /// `pdf_oxide` has no global state to set up, so the only precondition
    /// checked here is that temporary storage for the uploaded bytes works.
    /// This is all the engine gate verifies in production.
    fn initialize(&self) -> Result<(), String> {
        tempfile::tempfile()
            .map(|_| ())
            .map_err(|e| format!("temporary storage unavailable: {e}"))
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, FileLoaderError> {
        let doc = PdfDocument::open(path)
            .map_err(|e| FileLoaderError::ExtractionFailed(format!("failed to parse PDF: {e}")))?;

        let page_count = doc.page_count().map_err(|e| {
            FileLoaderError::ExtractionFailed(format!("failed to read page count: {e}"))
        })?;

        let mut pages = Vec::with_capacity(page_count);
        for page_index in 0..page_count {
            let text = doc.extract_text(page_index).unwrap_or_default();
            pages.push(text);
        }
        Ok(pages)
    }
}

#[derive(Debug)]
enum EngineState {
    Pending { failed_attempts: u32 },
    Ready,
    Unavailable(String),
}

pub struct PdfAdapter<B: PdfBackend = PdfOxideBackend> {
    backend: Arc<B>,
    state: Mutex<EngineState>,
}

impl PdfAdapter<PdfOxideBackend> {
    pub fn new() -> Self {
        Self::with_backend(PdfOxideBackend)
    }
}

impl Default for PdfAdapter<PdfOxideBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: PdfBackend> PdfAdapter<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            state: Mutex::new(EngineState::Pending { failed_attempts: 0 }),
        }
    }

    /// Initializes the backend on first use. Concurrent callers wait on the
    /// same lock, so only one initialization runs at a time.
    async fn ensure_ready(&self) -> Result<(), FileLoaderError> {
        let mut state = self.state.lock().await;
        match &*state {
            EngineState::Ready => Ok(()),
            EngineState::Unavailable(reason) => {
                Err(FileLoaderError::EngineUnavailable(reason.clone()))
            }
            EngineState::Pending { failed_attempts } => {
                let attempt = failed_attempts + 1;
                match self.backend.initialize() {
                    Ok(()) => {
                        tracing::info!(attempt, "PDF engine initialized");
                        *state = EngineState::Ready;
                        Ok(())
                    }
                    Err(reason) if attempt >= MAX_INIT_ATTEMPTS => {
                        tracing::error!(attempt, %reason, "PDF engine disabled");
                        *state = EngineState::Unavailable(reason.clone());
                        Err(FileLoaderError::EngineUnavailable(reason))
                    }
                    Err(reason) => {
                        tracing::warn!(attempt, %reason, "PDF engine initialization failed");
                        *state = EngineState::Pending {
                            failed_attempts: attempt,
                        };
                        Err(FileLoaderError::EngineUnavailable(reason))
                    }
                }
            }
        }
    }
}

#[async_trait]
impl<B: PdfBackend> FileLoader for PdfAdapter<B> {
    #[tracing::instrument(skip(self, data), fields(filename = %document.filename, size = data.len()))]
    async fn extract_text(
        &self,
        data: &[u8],
        document: &Document,
    ) -> Result<String, FileLoaderError> {
        if document.format() != Some(DocumentFormat::Pdf) {
            return Err(FileLoaderError::UnsupportedFormat(document.extension.clone()));
        }

        self.ensure_ready().await?;

        let mut temp_file = tempfile::NamedTempFile::new().map_err(|e| {
            FileLoaderError::ExtractionFailed(format!("failed to create temp file: {e}"))
        })?;
        temp_file.write_all(data).map_err(|e| {
            FileLoaderError::ExtractionFailed(format!("failed to write temp file: {e}"))
        })?;

        let temp_path = temp_file.path().to_path_buf();
        let backend = Arc::clone(&self.backend);

        let pages = tokio::time::timeout(
            EXTRACTION_TIMEOUT,
            tokio::task::spawn_blocking(move || backend.extract_pages(&temp_path)),
        )
        .await
        .map_err(|_| FileLoaderError::ExtractionFailed("PDF extraction timed out".to_string()))?
        .map_err(|e| FileLoaderError::ExtractionFailed(format!("task join error: {e}")))??;

        let page_count = pages.len();
        let text = pages
            .iter()
            .map(|page| page.trim())
            .filter(|page| !page.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        tracing::info!(page_count, chars = text.len(), "PDF text extraction complete");

        if text.is_empty() {
            return Err(FileLoaderError::NoTextFound(document.filename.clone()));
        }
        Ok(text)
    }
}
