use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ats::error::{AtsError, AtsResult};

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const LEGACY_DOC_MIME: &str = "application/msword";

/// Declared format of an uploaded résumé. Only these three pass the upload allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    LegacyDoc,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 3] = [
        DocumentFormat::Pdf,
        DocumentFormat::Docx,
        DocumentFormat::LegacyDoc,
    ];

    /// Maps an exact upload MIME type onto a format tag.
    pub fn from_mime_type(mime_type: &str) -> AtsResult<Self> {
        match mime_type {
            PDF_MIME => Ok(DocumentFormat::Pdf),
            DOCX_MIME => Ok(DocumentFormat::Docx),
            LEGACY_DOC_MIME => Ok(DocumentFormat::LegacyDoc),
            other => Err(AtsError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => PDF_MIME,
            DocumentFormat::Docx => DOCX_MIME,
            DocumentFormat::LegacyDoc => LEGACY_DOC_MIME,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::LegacyDoc => "legacy-doc",
        }
    }
}

/// An uploaded document as handed over by the upload layer. Read-only to the analyzer.
#[derive(Debug, Clone)]
pub struct Document {
    pub content: Bytes,
    pub format: DocumentFormat,
    pub file_name: String,
    pub size: usize,
}

impl Document {
    pub fn new(
        content: impl Into<Bytes>,
        format: DocumentFormat,
        file_name: impl Into<String>,
    ) -> Self {
        let content = content.into();
        Self {
            size: content.len(),
            content,
            format,
            file_name: file_name.into(),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_round_trip() {
        for format in DocumentFormat::ALL {
            assert_eq!(DocumentFormat::from_mime_type(format.mime_type()).unwrap(), format);
        }
    }

    #[test]
    fn test_unknown_mime_rejected() {
        let err = DocumentFormat::from_mime_type("image/png").unwrap_err();
        assert!(matches!(err, AtsError::UnsupportedFormat(ref m) if m == "image/png"));
    }

    #[test]
    fn test_mime_match_is_exact() {
        assert!(DocumentFormat::from_mime_type("Application/PDF").is_err());
        assert!(DocumentFormat::from_mime_type("").is_err());
    }

    #[test]
    fn test_document_size_from_buffer() {
        let doc = Document::new(vec![1u8, 2, 3], DocumentFormat::Pdf, "cv.pdf");
        assert_eq!(doc.size, 3);
        assert_eq!(doc.mime_type(), PDF_MIME);
        assert_eq!(doc.format.tag(), "pdf");
    }
}
