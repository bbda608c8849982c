use std::time::Duration;

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::ats::document::{Document, DocumentFormat};
use crate::ats::error::AtsResult;
use crate::ats::extractor::ExtractorRegistry;
use crate::ats::metrics::collect_metrics;
use crate::ats::report::{build_report, ScoreReport};
use crate::ats::scoring::{compute_score, ScoringConfig};
use crate::ats::sections::{detect_sections, SectionPatternConfig, SectionPatterns};

pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub scoring: ScoringConfig,
    pub sections: SectionPatternConfig,
    pub extraction_timeout: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            sections: SectionPatternConfig::default(),
            extraction_timeout: DEFAULT_EXTRACTION_TIMEOUT,
        }
    }
}

/// The document-to-score pipeline: extract → {sections, metrics} → score → report.
///
/// Holds no mutable state; share it behind an `Arc` and call it concurrently.
pub struct Analyzer {
    registry: ExtractorRegistry,
    patterns: SectionPatterns,
    scoring: ScoringConfig,
    extraction_timeout: Duration,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> AtsResult<Self> {
        Self::with_registry(config, ExtractorRegistry::default())
    }

    pub fn with_registry(config: AnalyzerConfig, registry: ExtractorRegistry) -> AtsResult<Self> {
        config.scoring.validate()?;
        for format in DocumentFormat::ALL {
            if !registry.supports(format) {
                warn!(
                    format = format.tag(),
                    "No extractor registered; uploads in this format will be rejected"
                );
            }
        }
        let patterns = SectionPatterns::compile(&config.sections)?;
        Ok(Self {
            registry,
            patterns,
            scoring: config.scoring,
            extraction_timeout: config.extraction_timeout,
        })
    }

    /// Scores an uploaded document. Extraction failures are returned as-is with
    /// no partial report and are never retried here.
    pub async fn analyze(&self, document: &Document) -> AtsResult<ScoreReport> {
        let analysis_id = Uuid::new_v4();
        let span = info_span!(
            "ats_analysis",
            %analysis_id,
            file_name = %document.file_name,
            format = document.format.tag(),
            size = document.size,
        );

        async move {
            let text = self.extract(document).await?;
            self.analyze_text(&text, &document.file_name, document.mime_type())
        }
        .instrument(span)
        .await
    }

    /// Text only, without scoring.
    pub async fn extract(&self, document: &Document) -> AtsResult<String> {
        self.registry
            .extract_text(document, self.extraction_timeout)
            .await
    }

    /// Scores text that has already been extracted (or pasted in).
    pub fn analyze_text(
        &self,
        text: &str,
        file_name: &str,
        mime_type: &str,
    ) -> AtsResult<ScoreReport> {
        let metrics = collect_metrics(text);
        let sections = detect_sections(text, &self.patterns);
        let outcome = compute_score(
            text,
            metrics.word_count,
            &sections,
            metrics.bullet_count,
            &self.scoring,
        )?;
        let report = build_report(file_name, mime_type, metrics, sections, outcome);

        info!(
            score = report.score(),
            path = ?report.score_path(),
            word_count = report.metrics().word_count,
            bullet_count = report.metrics().bullet_count,
            missing_sections = ?report.sections().missing(),
            issues = report.issues().len(),
            "ATS analysis complete"
        );

        Ok(report)
    }
}
