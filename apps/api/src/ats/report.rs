#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use crate::ats::metrics::Metrics;
use crate::ats::scoring::{ScoreOutcome, ScorePath};
use crate::ats::sections::SectionPresence;

/// Final diagnostic returned for one analysed document. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    score: u32,
    file_name: String,
    mime_type: String,
    metrics: Metrics,
    sections: SectionPresence,
    issues: Vec<String>,
    score_path: ScorePath,
}

impl ScoreReport {
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub fn sections(&self) -> SectionPresence {
        self.sections
    }

    pub fn issues(&self) -> &[String] {
        &self.issues
    }

    /// `Guard` scores come from the short-content rule and sit on a different scale.
    pub fn score_path(&self) -> ScorePath {
        self.score_path
    }
}

/// Attaches caller metadata to the scorer's output.
pub fn build_report(
    file_name: impl Into<String>,
    mime_type: impl Into<String>,
    metrics: Metrics,
    sections: SectionPresence,
    outcome: ScoreOutcome,
) -> ScoreReport {
    ScoreReport {
        score: outcome.score,
        file_name: file_name.into(),
        mime_type: mime_type.into(),
        metrics,
        sections,
        issues: outcome.issues,
        score_path: outcome.path,
    }
}
