use super::document::extension_of;

pub const DEFAULT_ACCEPTED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "rtf", "md", "csv", "json", "yaml", "yml", "js", "jsx", "ts",
    "tsx", "py", "html", "css",
];

pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadRejection {
    #[error("File {filename} is too large (max: {max_mb}MB)")]
    TooLarge { filename: String, max_mb: u64 },
    #[error("File type .{extension} is not supported")]
    UnsupportedType { extension: String },
}

/// Gate applied to every uploaded file before it is used.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    accepted_extensions: Vec<String>,
    max_file_size_mb: u64,
}

impl UploadPolicy {
    pub fn new(accepted_extensions: Vec<String>, max_file_size_mb: u64) -> Self {
        Self {
            accepted_extensions: accepted_extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            max_file_size_mb,
        }
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }

    pub fn check(&self, filename: &str, size_bytes: u64) -> Result<(), UploadRejection> {
        if size_bytes > self.max_file_size_bytes() {
            return Err(UploadRejection::TooLarge {
                filename: filename.to_string(),
                max_mb: self.max_file_size_mb,
            });
        }

        let extension = extension_of(filename);
        if !self.accepted_extensions.iter().any(|e| *e == extension) {
            return Err(UploadRejection::UnsupportedType { extension });
        }

        Ok(())
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_ACCEPTED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            DEFAULT_MAX_FILE_SIZE_MB,
        )
    }
}
