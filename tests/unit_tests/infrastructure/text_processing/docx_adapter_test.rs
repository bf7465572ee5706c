use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::FileOptions;

use helpai::application::ports::{FileLoader, FileLoaderError};
use helpai::domain::Document;
use helpai::infrastructure::text_processing::{DocxAdapter, docx_xml_to_text};

fn docx_with(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Kaffe &amp; kage</w:t></w:r></w:p><w:p><w:r><w:t>Første</w:t><w:tab/><w:t>linje</w:t><w:br/><w:t>anden linje</w:t></w:r></w:p><w:p></w:p></w:body></w:document>"#;

#[tokio::test]
async fn given_docx_archive_when_extracting_then_returns_paragraphs() {
    let data = docx_with(&[("word/document.xml", DOCUMENT_XML)]);
    let document = Document::new("brev.docx", data.len() as u64);

    let text = DocxAdapter.extract_text(&data, &document).await.unwrap();

    assert_eq!(text, "Kaffe & kage\n\nFørste\tlinje\nanden linje");
}

#[tokio::test]
async fn given_archive_without_document_part_when_extracting_then_fails() {
    let data = docx_with(&[("word/styles.xml", "<w:styles/>")]);
    let document = Document::new("odd.docx", data.len() as u64);

    let result = DocxAdapter.extract_text(&data, &document).await;

    assert!(matches!(result, Err(FileLoaderError::ExtractionFailed(_))));
}

#[tokio::test]
async fn given_bytes_that_are_not_zip_when_extracting_then_fails() {
    let data = b"definitely not a zip archive";
    let document = Document::new("fake.docx", data.len() as u64);

    let result = DocxAdapter.extract_text(data, &document).await;

    assert!(matches!(result, Err(FileLoaderError::ExtractionFailed(_))));
}

#[tokio::test]
async fn given_document_with_only_empty_paragraphs_when_extracting_then_no_text_found() {
    let xml = "<w:document><w:body><w:p></w:p><w:p><w:r><w:t>  </w:t></w:r></w:p></w:body></w:document>";
    let data = docx_with(&[("word/document.xml", xml)]);
    let document = Document::new("empty.docx", data.len() as u64);

    let result = DocxAdapter.extract_text(&data, &document).await;

    assert_eq!(
        result,
        Err(FileLoaderError::NoTextFound("empty.docx".to_string()))
    );
}

#[test]
fn given_escaped_entities_when_flattening_then_decodes_each_once() {
    let xml = "<w:p><w:t>&lt;tag&gt; &quot;q&quot; &apos;a&apos; &amp;lt;</w:t></w:p>";

    assert_eq!(docx_xml_to_text(xml), "<tag> \"q\" 'a' &lt;");
}
