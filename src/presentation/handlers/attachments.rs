use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::application::ports::InlineAttachment;
use crate::domain::{UploadPolicy, extension_of};

/// A file sent inline with a chat request.
#[derive(Debug, Clone, Deserialize)]
pub struct FileData {
    pub name: String,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    /// Base64 encoded content.
    pub data: String,
}

/// Validates inline files for the model. Files failing the upload gate are
/// dropped with a warning; undecodable content rejects the whole request.
pub fn build_attachments(
    files: Vec<FileData>,
    policy: &UploadPolicy,
) -> Result<Vec<InlineAttachment>, String> {
    let mut attachments = Vec::with_capacity(files.len());

    for file in files {
        let decoded = STANDARD
            .decode(file.data.trim())
            .map_err(|e| format!("File {} is not valid base64: {}", file.name, e))?;

        if let Err(rejection) = policy.check(&file.name, decoded.len() as u64) {
            tracing::warn!(filename = %file.name, reason = %rejection, "Dropping attachment");
            continue;
        }

        let mime_type = if file.mime_type.trim().is_empty() {
            mime_for_extension(&extension_of(&file.name)).to_string()
        } else {
            file.mime_type
        };

        attachments.push(InlineAttachment {
            name: file.name,
            mime_type,
            data_base64: file.data.trim().to_string(),
        });
    }

    Ok(attachments)
}

fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "rtf" => "application/rtf",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "json" => "application/json",
        "yaml" | "yml" => "application/x-yaml",
        "js" | "jsx" => "text/javascript",
        "ts" | "tsx" => "text/x-typescript",
        "py" => "text/x-python",
        "html" => "text/html",
        "css" => "text/css",
        _ => "text/plain",
    }
}
