// ATS compliance analysis: document → plain text → heuristic score report.
// Everything here except `handlers` is transport-free and can be driven with
// in-memory buffers.

pub mod analyzer;
pub mod document;
pub mod error;
pub mod extractor;
pub mod handlers;
pub mod metrics;
pub mod report;
pub mod scoring;
pub mod sections;

#[cfg(test)]
pub(crate) mod test_support;
