use std::path::Path;

/// Formats the extractor knows how to turn into plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Docx,
    Pdf,
    PlainText,
}

impl DocumentFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "docx" => Some(Self::Docx),
            "pdf" => Some(Self::Pdf),
            "txt" | "md" | "json" | "csv" => Some(Self::PlainText),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pdf => "pdf",
            Self::PlainText => "text",
        }
    }
}

/// An uploaded file as seen by the extractor. The bytes travel separately.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub filename: String,
    pub extension: String,
    pub size_bytes: u64,
}

impl Document {
    pub fn new(filename: impl Into<String>, size_bytes: u64) -> Self {
        let filename = filename.into();
        let extension = extension_of(&filename);
        Self {
            filename,
            extension,
            size_bytes,
        }
    }

    pub fn format(&self) -> Option<DocumentFormat> {
        DocumentFormat::from_extension(&self.extension)
    }
}

/// Lower-cased extension without the dot, or an empty string.
pub fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default()
}
