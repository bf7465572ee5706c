mod composite_file_loader;
mod docx_adapter;
mod pdf_adapter;
mod plain_text_adapter;

use std::sync::Arc;

use crate::application::ports::FileLoader;
use crate::domain::DocumentFormat;

pub use composite_file_loader::CompositeFileLoader;
pub use docx_adapter::{DocxAdapter, docx_xml_to_text};
pub use pdf_adapter::{MAX_INIT_ATTEMPTS, PdfAdapter, PdfBackend, PdfOxideBackend};
pub use plain_text_adapter::PlainTextAdapter;

/// Loader covering every format the analysis path can read.
pub fn default_file_loader() -> CompositeFileLoader {
    CompositeFileLoader::new(vec![
        (DocumentFormat::PlainText, Arc::new(PlainTextAdapter) as Arc<dyn FileLoader>),
        (DocumentFormat::Docx, Arc::new(DocxAdapter)),
        (DocumentFormat::Pdf, Arc::new(PdfAdapter::new())),
    ])
}
