use helpai::application::ports::{FileLoader, FileLoaderError};
use helpai::domain::Document;
use helpai::infrastructure::text_processing::PlainTextAdapter;

#[tokio::test]
async fn given_utf8_markdown_when_extracting_then_returns_trimmed_text() {
    let data = "\n  # Overskrift\nBrød og smør  \n".as_bytes();
    let document = Document::new("notes.md", data.len() as u64);

    let text = PlainTextAdapter.extract_text(data, &document).await.unwrap();

    assert_eq!(text, "# Overskrift\nBrød og smør");
}

#[tokio::test]
async fn given_invalid_utf8_when_extracting_then_fails_extraction() {
    let data = [0xff, 0xfe, 0x00, 0x41];
    let document = Document::new("data.csv", data.len() as u64);

    let result = PlainTextAdapter.extract_text(&data, &document).await;

    assert!(matches!(result, Err(FileLoaderError::ExtractionFailed(_))));
}

#[tokio::test]
async fn given_non_text_document_when_extracting_then_returns_unsupported() {
    let document = Document::new("report.pdf", 3);

    let result = PlainTextAdapter.extract_text(b"abc", &document).await;

    assert_eq!(
        result,
        Err(FileLoaderError::UnsupportedFormat("pdf".to_string()))
    );
}
