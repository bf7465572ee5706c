use async_trait::async_trait;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{Document, DocumentFormat};

/// Reads `.txt`, `.md`, `.json` and `.csv` files as UTF-8.
pub struct PlainTextAdapter;

#[async_trait]
impl FileLoader for PlainTextAdapter {
    async fn extract_text(
        &self,
        data: &[u8],
        document: &Document,
    ) -> Result<String, FileLoaderError> {
        if document.format() != Some(DocumentFormat::PlainText) {
            return Err(FileLoaderError::UnsupportedFormat(document.extension.clone()));
        }

        let text = std::str::from_utf8(data)
            .map_err(|e| FileLoaderError::ExtractionFailed(format!("invalid UTF-8: {e}")))?;

        Ok(text.trim().to_string())
    }
}
