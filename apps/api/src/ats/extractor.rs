//! Text extraction: format-specific adapters turning an uploaded buffer into plain text.
//!
//! Each format has its own `TextExtractor`; `ExtractorRegistry` dispatches on the
//! document's declared format and bounds the decode step with a timeout.
//!
//! Soft failures (a corrupt PDF, a damaged DOCX) log a warning and return an empty
//! string so the scorer treats the document as "too short". Hard faults (the decode
//! library crashing, a legacy `.doc` that is not an OOXML container) surface as
//! `AtsError::Extraction`.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ats::document::{Document, DocumentFormat};
use crate::ats::error::{AtsError, AtsResult};

/// Adapter from a binary buffer to plain text for one document format.
///
/// Carried in `ExtractorRegistry` as `Arc<dyn TextExtractor>`.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    fn format(&self) -> DocumentFormat;

    fn name(&self) -> &'static str;

    async fn extract(&self, content: Bytes) -> AtsResult<String>;
}

// ────────────────────────────────────────────────────────────────────────────
// Adapters
// ────────────────────────────────────────────────────────────────────────────

/// Reads the text of every page via `pdf-extract`.
pub struct PdfExtractor;

#[async_trait]
impl TextExtractor for PdfExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn name(&self) -> &'static str {
        "pdf"
    }

    async fn extract(&self, content: Bytes) -> AtsResult<String> {
        run_blocking(self.name(), move || {
            match pdf_extract::extract_text_from_mem(&content) {
                Ok(text) => Ok(text),
                Err(e) => {
                    warn!(adapter = "pdf", error = %e, "PDF parse error, continuing with empty text");
                    Ok(String::new())
                }
            }
        })
        .await
    }
}

/// Reads paragraph text from an OOXML `.docx` package.
pub struct DocxExtractor;

#[async_trait]
impl TextExtractor for DocxExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn name(&self) -> &'static str {
        "docx"
    }

    async fn extract(&self, content: Bytes) -> AtsResult<String> {
        run_blocking(self.name(), move || match read_ooxml_text(&content) {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!(adapter = "docx", error = %e, "DOCX parse error, continuing with empty text");
                Ok(String::new())
            }
        })
        .await
    }
}

/// Handles uploads declared as `application/msword`.
///
/// These are decoded through the OOXML reader, since files labelled `.doc` are
/// usually Word 2007+ packages. A genuine binary Word 97 file has no ZIP container
/// and is reported as a hard extraction failure.
pub struct LegacyDocExtractor;

#[async_trait]
impl TextExtractor for LegacyDocExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::LegacyDoc
    }

    fn name(&self) -> &'static str {
        "legacy-doc"
    }

    async fn extract(&self, content: Bytes) -> AtsResult<String> {
        run_blocking(self.name(), move || match read_ooxml_text(&content) {
            Ok(text) => Ok(text),
            Err(OoxmlError::Container(e)) => Err(AtsError::Extraction(format!(
                "legacy Word document is not an OOXML container: {e}"
            ))),
            Err(e) => {
                warn!(adapter = "legacy-doc", error = %e, "DOC parse error, continuing with empty text");
                Ok(String::new())
            }
        })
        .await
    }
}

/// Runs a decode closure on the blocking pool. A panic inside the decode library
/// becomes `AtsError::Extraction` instead of tearing down the request task.
async fn run_blocking<F>(adapter: &'static str, decode: F) -> AtsResult<String>
where
    F: FnOnce() -> AtsResult<String> + Send + 'static,
{
    tokio::task::spawn_blocking(decode).await.map_err(|e| {
        if e.is_panic() {
            AtsError::Extraction(format!("{adapter} decoder crashed on malformed input"))
        } else {
            AtsError::Extraction(format!("{adapter} decoder was cancelled"))
        }
    })?
}

// ────────────────────────────────────────────────────────────────────────────
// OOXML reader
// ────────────────────────────────────────────────────────────────────────────

const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Error)]
enum OoxmlError {
    #[error("not a ZIP container: {0}")]
    Container(#[from] zip::result::ZipError),

    #[error("package has no word/document.xml part")]
    MissingBody,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

fn read_ooxml_text(content: &[u8]) -> Result<String, OoxmlError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(content))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|_| OoxmlError::MissingBody)?
        .read_to_string(&mut xml)?;
    Ok(paragraph_text(&xml)?)
}

/// Collects the text of each `w:p` paragraph, one per line.
/// Tables are skipped entirely; run properties and drawings carry no `w:t` text.
fn paragraph_text(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut table_depth = 0usize;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tbl" => table_depth += 1,
                b"r" => in_run = true,
                b"t" => in_text = in_run,
                b"tab" if in_run => current.push('\t'),
                b"br" | b"cr" if in_run => current.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" if in_run => current.push('\t'),
                b"br" | b"cr" if in_run => current.push('\n'),
                b"p" if table_depth == 0 => paragraphs.push(String::new()),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                b"r" => in_run = false,
                b"t" => in_text = false,
                b"p" => {
                    let text = std::mem::take(&mut current);
                    if table_depth == 0 {
                        paragraphs.push(text);
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_text && table_depth == 0 => {
                current.push_str(&t.unescape().map_err(quick_xml::Error::from)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

/// Extractors keyed by the format they decode.
pub struct ExtractorRegistry {
    extractors: HashMap<DocumentFormat, Arc<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    /// An empty registry. Most callers want `ExtractorRegistry::default()`.
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Registers an extractor, replacing any previous one for the same format.
    pub fn register(&mut self, extractor: Arc<dyn TextExtractor>) {
        self.extractors.insert(extractor.format(), extractor);
    }

    pub fn supports(&self, format: DocumentFormat) -> bool {
        self.extractors.contains_key(&format)
    }

    pub fn get(&self, format: DocumentFormat) -> AtsResult<Arc<dyn TextExtractor>> {
        self.extractors
            .get(&format)
            .cloned()
            .ok_or_else(|| AtsError::UnsupportedFormat(format.mime_type().to_string()))
    }

    /// Extracts the document's text, giving up after `timeout`.
    /// Expiry is reported as `ExtractionTimeout`, never as a parse failure.
    pub async fn extract_text(&self, document: &Document, timeout: Duration) -> AtsResult<String> {
        let extractor = self.get(document.format)?;
        debug!(
            adapter = extractor.name(),
            size = document.size,
            "Extracting document text"
        );

        match tokio::time::timeout(timeout, extractor.extract(document.content.clone())).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    adapter = extractor.name(),
                    file_name = %document.file_name,
                    "Text extraction exceeded {:?}",
                    timeout
                );
                Err(AtsError::ExtractionTimeout(timeout))
            }
        }
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PdfExtractor));
        registry.register(Arc::new(DocxExtractor));
        registry.register(Arc::new(LegacyDocExtractor));
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ats::test_support::{docx_bytes, docx_from_body, pdf_bytes};

    const TIMEOUT: Duration = Duration::from_secs(5);

    struct SlowExtractor;

    #[async_trait]
    impl TextExtractor for SlowExtractor {
        fn format(&self) -> DocumentFormat {
            DocumentFormat::Pdf
        }

        fn name(&self) -> &'static str {
            "slow"
        }

        async fn extract(&self, _content: Bytes) -> AtsResult<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("never".to_string())
        }
    }

    struct CrashingExtractor;

    #[async_trait]
    impl TextExtractor for CrashingExtractor {
        fn format(&self) -> DocumentFormat {
            DocumentFormat::Docx
        }

        fn name(&self) -> &'static str {
            "crashing"
        }

        async fn extract(&self, _content: Bytes) -> AtsResult<String> {
            run_blocking(self.name(), || panic!("decoder blew up")).await
        }
    }

    #[test]
    fn test_paragraphs_one_per_line() {
        let xml = r#"<w:document xmlns:w="w"><w:body>
            <w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>
            <w:p><w:r><w:t xml:space="preserve">Email: </w:t></w:r><w:r><w:t>jane@x.io</w:t></w:r></w:p>
        </w:body></w:document>"#;
        assert_eq!(paragraph_text(xml).unwrap(), "Jane Doe\nEmail: jane@x.io");
    }

    #[test]
    fn test_tables_are_discarded() {
        let xml = r#"<w:document xmlns:w="w"><w:body>
            <w:p><w:r><w:t>Skills</w:t></w:r></w:p>
            <w:tbl><w:tr><w:tc><w:p><w:r><w:t>Rust</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
            <w:p><w:r><w:t>Education</w:t></w:r></w:p>
        </w:body></w:document>"#;
        assert_eq!(paragraph_text(xml).unwrap(), "Skills\nEducation");
    }

    #[test]
    fn test_tabs_breaks_and_entities() {
        let xml = r#"<w:document xmlns:w="w"><w:body>
            <w:p><w:pPr><w:tabs><w:tab w:val="left"/></w:tabs></w:pPr>
            <w:r><w:t>R&amp;D</w:t><w:tab/><w:t>Lead</w:t><w:br/><w:t>2021</w:t></w:r></w:p>
            <w:p/>
        </w:body></w:document>"#;
        assert_eq!(paragraph_text(xml).unwrap(), "R&D\tLead\n2021\n");
    }

    #[tokio::test]
    async fn test_docx_extracts_paragraphs() {
        let content = docx_bytes(&["Summary", "- Built things"]);
        let text = DocxExtractor.extract(Bytes::from(content)).await.unwrap();
        assert_eq!(text, "Summary\n- Built things");
    }

    #[tokio::test]
    async fn test_docx_garbage_is_soft_failure() {
        let text = DocxExtractor
            .extract(Bytes::from_static(b"definitely not a zip"))
            .await
            .unwrap();
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn test_docx_without_body_part_is_soft_failure() {
        let content = docx_from_body("word/other.xml", "<x/>");
        let text = DocxExtractor.extract(Bytes::from(content)).await.unwrap();
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn test_pdf_garbage_is_soft_failure() {
        let result = PdfExtractor
            .extract(Bytes::from_static(b"not a pdf at all"))
            .await;
        assert!(matches!(result, Ok(ref t) if t.is_empty()), "got {result:?}");
    }

    #[tokio::test]
    async fn test_pdf_page_text_extracted() {
        let content = pdf_bytes("Technical Skills and Work History");
        let text = PdfExtractor.extract(Bytes::from(content)).await.unwrap();
        assert!(text.contains("Technical Skills"), "got {text:?}");
        assert!(text.contains("Work History"), "got {text:?}");
    }

    #[tokio::test]
    async fn test_legacy_doc_reads_ooxml_package() {
        let content = docx_bytes(&["Experience"]);
        let text = LegacyDocExtractor.extract(Bytes::from(content)).await.unwrap();
        assert_eq!(text, "Experience");
    }

    #[tokio::test]
    async fn test_legacy_doc_binary_is_hard_failure() {
        let ole_header: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0, 0, 0, 0];
        let err = LegacyDocExtractor
            .extract(Bytes::from_static(ole_header))
            .await
            .unwrap_err();
        assert!(matches!(err, AtsError::Extraction(_)));
    }

    #[tokio::test]
    async fn test_decoder_panic_becomes_extraction_error() {
        let err = CrashingExtractor.extract(Bytes::new()).await.unwrap_err();
        assert!(matches!(err, AtsError::Extraction(ref m) if m.contains("crashing")));
    }

    #[tokio::test]
    async fn test_default_registry_covers_all_formats() {
        let registry = ExtractorRegistry::default();
        for format in DocumentFormat::ALL {
            assert!(registry.supports(format));
            assert_eq!(registry.get(format).unwrap().format(), format);
        }
    }

    #[tokio::test]
    async fn test_missing_adapter_is_unsupported() {
        let registry = ExtractorRegistry::new();
        let doc = Document::new(Vec::new(), DocumentFormat::Pdf, "cv.pdf");
        let err = registry.extract_text(&doc, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, AtsError::UnsupportedFormat(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_decode_times_out() {
        let mut registry = ExtractorRegistry::new();
        registry.register(Arc::new(SlowExtractor));
        let doc = Document::new(Vec::new(), DocumentFormat::Pdf, "slow.pdf");

        let err = registry
            .extract_text(&doc, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AtsError::ExtractionTimeout(d) if d == Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_registry_dispatches_on_format() {
        let registry = ExtractorRegistry::default();
        let doc = Document::new(docx_bytes(&["Projects"]), DocumentFormat::Docx, "cv.docx");
        assert_eq!(registry.extract_text(&doc, TIMEOUT).await.unwrap(), "Projects");
    }
}
