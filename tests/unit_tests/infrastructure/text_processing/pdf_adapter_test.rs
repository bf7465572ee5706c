use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use helpai::application::ports::{FileLoader, FileLoaderError};
use helpai::domain::Document;
use helpai::infrastructure::text_processing::{MAX_INIT_ATTEMPTS, PdfAdapter, PdfBackend};

/// Fails initialization `failures` times, then serves fixed pages.
struct FakeBackend {
    failures: u32,
    init_calls: Arc<AtomicU32>,
    pages: Vec<&'static str>,
}

impl FakeBackend {
    fn new(failures: u32, pages: Vec<&'static str>) -> (Self, Arc<AtomicU32>) {
        let init_calls = Arc::new(AtomicU32::new(0));
        (
            Self {
                failures,
                init_calls: Arc::clone(&init_calls),
                pages,
            },
            init_calls,
        )
    }
}

impl PdfBackend for FakeBackend {
    fn initialize(&self) -> Result<(), String> {
        let call = self.init_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            Err(format!("engine failed on attempt {call}"))
        } else {
            Ok(())
        }
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, FileLoaderError> {
        assert!(path.exists());
        Ok(self.pages.iter().map(|p| p.to_string()).collect())
    }
}

fn pdf(name: &str) -> Document {
    Document::new(name, 8)
}

#[tokio::test]
async fn given_pages_with_blanks_when_extracting_then_joins_text_pages_with_newline() {
    let (backend, _) = FakeBackend::new(0, vec!["  Page one ", "", "   ", "Page two"]);
    let adapter = PdfAdapter::with_backend(backend);

    let text = adapter.extract_text(b"%PDF-1.4", &pdf("a.pdf")).await.unwrap();

    assert_eq!(text, "Page one\nPage two");
}

#[tokio::test]
async fn given_only_blank_pages_when_extracting_then_no_text_found() {
    let (backend, _) = FakeBackend::new(0, vec!["", "  "]);
    let adapter = PdfAdapter::with_backend(backend);

    let result = adapter.extract_text(b"%PDF-1.4", &pdf("scan.pdf")).await;

    assert_eq!(
        result,
        Err(FileLoaderError::NoTextFound("scan.pdf".to_string()))
    );
}

#[tokio::test]
async fn given_engine_ready_when_extracting_twice_then_initializes_once() {
    let (backend, init_calls) = FakeBackend::new(0, vec!["text"]);
    let adapter = PdfAdapter::with_backend(backend);

    adapter.extract_text(b"%PDF", &pdf("a.pdf")).await.unwrap();
    adapter.extract_text(b"%PDF", &pdf("b.pdf")).await.unwrap();

    assert_eq!(init_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn given_transient_init_failure_when_retrying_then_recovers() {
    let (backend, init_calls) = FakeBackend::new(1, vec!["text"]);
    let adapter = PdfAdapter::with_backend(backend);

    let first = adapter.extract_text(b"%PDF", &pdf("a.pdf")).await;
    let second = adapter.extract_text(b"%PDF", &pdf("a.pdf")).await;

    assert!(matches!(first, Err(FileLoaderError::EngineUnavailable(_))));
    assert_eq!(second.unwrap(), "text");
    assert_eq!(init_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn given_persistent_init_failure_when_limit_reached_then_fails_fast_forever() {
    let (backend, init_calls) = FakeBackend::new(u32::MAX, vec!["text"]);
    let adapter = PdfAdapter::with_backend(backend);

    for _ in 0..MAX_INIT_ATTEMPTS + 2 {
        let result = adapter.extract_text(b"%PDF", &pdf("a.pdf")).await;
        assert!(matches!(result, Err(FileLoaderError::EngineUnavailable(_))));
    }

    assert_eq!(init_calls.load(Ordering::SeqCst), MAX_INIT_ATTEMPTS);
}

#[tokio::test]
async fn given_concurrent_first_use_when_extracting_then_initializes_once() {
    let (backend, init_calls) = FakeBackend::new(0, vec!["text"]);
    let adapter = Arc::new(PdfAdapter::with_backend(backend));

    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let adapter = Arc::clone(&adapter);
            tokio::spawn(async move {
                adapter
                    .extract_text(b"%PDF", &pdf(&format!("{i}.pdf")))
                    .await
            })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }

    assert_eq!(init_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn given_non_pdf_document_when_extracting_then_returns_unsupported() {
    let (backend, init_calls) = FakeBackend::new(0, vec!["text"]);
    let adapter = PdfAdapter::with_backend(backend);

    let result = adapter
        .extract_text(b"hello", &Document::new("notes.txt", 5))
        .await;

    assert_eq!(
        result,
        Err(FileLoaderError::UnsupportedFormat("txt".to_string()))
    );
    assert_eq!(init_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn given_garbage_bytes_when_extracting_with_real_engine_then_fails_extraction() {
    let adapter = PdfAdapter::new();

    let result = adapter
        .extract_text(b"this is not a pdf", &pdf("broken.pdf"))
        .await;

    assert!(matches!(result, Err(FileLoaderError::ExtractionFailed(_))));
}
