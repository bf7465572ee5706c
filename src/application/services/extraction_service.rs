use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;
use serde::Serialize;

use crate::application::ports::{FileLoader, FileLoaderError};
use crate::domain::{Document, UploadPolicy};

/// A file as received from the client, before any extraction.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    pub filename: String,
    pub text: String,
}

/// A file that was skipped. Never fatal to the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionWarning {
    #[serde(rename = "file")]
    pub filename: String,
    #[serde(rename = "error")]
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionBatch {
    /// Successfully extracted documents, in submission order.
    pub documents: Vec<ExtractedDocument>,
    pub warnings: Vec<ExtractionWarning>,
}

pub struct ExtractionService {
    file_loader: Arc<dyn FileLoader>,
    upload_policy: UploadPolicy,
}

impl ExtractionService {
    pub fn new(file_loader: Arc<dyn FileLoader>, upload_policy: UploadPolicy) -> Self {
        Self {
            file_loader,
            upload_policy,
        }
    }

    /// Extracts every file concurrently. Rejected or unreadable files end up
    /// in `warnings`; the rest keep their submission order.
    pub async fn extract_all(&self, files: &[UploadedFile]) -> ExtractionBatch {
        let results = join_all(files.iter().map(|file| self.extract_one(file))).await;

        let mut batch = ExtractionBatch::default();
        for (file, result) in files.iter().zip(results) {
            match result {
                Ok(text) => batch.documents.push(ExtractedDocument {
                    filename: file.filename.clone(),
                    text,
                }),
                Err(message) => {
                    tracing::warn!(filename = %file.filename, error = %message, "Skipping file");
                    batch.warnings.push(ExtractionWarning {
                        filename: file.filename.clone(),
                        message,
                    });
                }
            }
        }

        tracing::info!(
            extracted = batch.documents.len(),
            skipped = batch.warnings.len(),
            "File extraction complete"
        );
        batch
    }

    async fn extract_one(&self, file: &UploadedFile) -> Result<String, String> {
        let size_bytes = file.data.len() as u64;
        self.upload_policy
            .check(&file.filename, size_bytes)
            .map_err(|e| e.to_string())?;

        let document = Document::new(file.filename.clone(), size_bytes);
        let text = self
            .file_loader
            .extract_text(&file.data, &document)
            .await
            .map_err(|e| e.to_string())?;

        let text = text.trim();
        if text.is_empty() {
            return Err(FileLoaderError::NoTextFound(file.filename.clone()).to_string());
        }
        Ok(text.to_string())
    }
}

/// Joins free text and extracted documents, dropping empty parts.
pub fn combine_text(text: &str, documents: &[ExtractedDocument]) -> String {
    std::iter::once(text.trim())
        .chain(documents.iter().map(|d| d.text.as_str()))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
