use std::sync::Arc;
use std::time::Duration;

use helpai::application::ports::{FileLoader, FileLoaderError};
use helpai::application::services::{
    ExtractedDocument, ExtractionService, UploadedFile, combine_text,
};
use helpai::domain::{Document, UploadPolicy};

struct ScriptedFileLoader;

#[async_trait::async_trait]
impl FileLoader for ScriptedFileLoader {
    async fn extract_text(&self, data: &[u8], doc: &Document) -> Result<String, FileLoaderError> {
        if doc.filename.starts_with("slow") {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        if doc.filename.starts_with("broken") {
            return Err(FileLoaderError::ExtractionFailed("corrupt file".to_string()));
        }
        String::from_utf8(data.to_vec())
            .map_err(|e| FileLoaderError::ExtractionFailed(e.to_string()))
    }
}

fn service(policy: UploadPolicy) -> ExtractionService {
    ExtractionService::new(Arc::new(ScriptedFileLoader), policy)
}

#[tokio::test]
async fn given_files_finishing_out_of_order_when_extracting_then_keeps_submission_order() {
    let files = vec![
        UploadedFile::new("slow.txt", "first"),
        UploadedFile::new("fast.txt", "second"),
    ];

    let batch = service(UploadPolicy::default()).extract_all(&files).await;

    let names: Vec<&str> = batch.documents.iter().map(|d| d.filename.as_str()).collect();
    assert_eq!(names, vec!["slow.txt", "fast.txt"]);
    assert!(batch.warnings.is_empty());
}

#[tokio::test]
async fn given_unsupported_and_broken_files_when_extracting_then_warns_per_file() {
    let files = vec![
        UploadedFile::new("song.mp3", "noise"),
        UploadedFile::new("good.txt", "  useful text  "),
        UploadedFile::new("broken.txt", "whatever"),
    ];

    let batch = service(UploadPolicy::default()).extract_all(&files).await;

    assert_eq!(
        batch.documents,
        vec![ExtractedDocument {
            filename: "good.txt".to_string(),
            text: "useful text".to_string(),
        }]
    );
    assert_eq!(batch.warnings.len(), 2);
    assert_eq!(batch.warnings[0].filename, "song.mp3");
    assert_eq!(batch.warnings[0].message, "File type .mp3 is not supported");
    assert_eq!(batch.warnings[1].filename, "broken.txt");
    assert!(batch.warnings[1].message.contains("corrupt file"));
}

#[tokio::test]
async fn given_file_over_size_limit_when_extracting_then_warns_without_loading() {
    let policy = UploadPolicy::new(vec!["txt".to_string()], 1);
    let files = vec![UploadedFile::new("huge.txt", vec![b'a'; 1024 * 1024 + 1])];

    let batch = service(policy).extract_all(&files).await;

    assert!(batch.documents.is_empty());
    assert_eq!(
        batch.warnings[0].message,
        "File huge.txt is too large (max: 1MB)"
    );
}

#[tokio::test]
async fn given_whitespace_only_file_when_extracting_then_reports_no_text() {
    let files = vec![UploadedFile::new("blank.txt", "   \n\t ")];

    let batch = service(UploadPolicy::default()).extract_all(&files).await;

    assert!(batch.documents.is_empty());
    assert_eq!(
        batch.warnings[0].message,
        FileLoaderError::NoTextFound("blank.txt".to_string()).to_string()
    );
}

#[test]
fn given_text_and_documents_when_combining_then_joins_non_empty_parts_with_blank_line() {
    let documents = vec![
        ExtractedDocument {
            filename: "a.txt".to_string(),
            text: "from file".to_string(),
        },
        ExtractedDocument {
            filename: "b.txt".to_string(),
            text: String::new(),
        },
    ];

    assert_eq!(
        combine_text("  typed text ", &documents),
        "typed text\n\nfrom file"
    );
    assert_eq!(combine_text("   ", &documents), "from file");
    assert_eq!(combine_text("", &[]), "");
}

#[test]
fn given_warning_when_serializing_then_uses_file_and_error_keys() {
    let warning = helpai::application::services::ExtractionWarning {
        filename: "x.pdf".to_string(),
        message: "bad".to_string(),
    };

    let json = serde_json::to_value(&warning).unwrap();

    assert_eq!(json, serde_json::json!({"file": "x.pdf", "error": "bad"}));
}
