use std::time::Duration;

use thiserror::Error;

/// Failures raised by the analysis pipeline.
///
/// An empty extracted text is not an error: it flows into the short-content
/// guard and still produces a report.
#[derive(Debug, Error)]
pub enum AtsError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Text extraction timed out after {0:?}")]
    ExtractionTimeout(Duration),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Invalid analyzer configuration: {0}")]
    Config(String),
}

pub type AtsResult<T> = Result<T, AtsError>;
