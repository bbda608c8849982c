//! Score calculation: turns metrics and section presence into a 0–100 score plus issues.
//!
//! Algorithm (defaults shown, all numbers come from `ScoringConfig`):
//! - Guard: fewer than 20 words → score = max(5, words), single "too short" issue, stop.
//! - Length: <150 words +20 (light), 150..=800 +35, >800 +25 (long).
//! - Sections: contact 10, skills 15, experience 20, education 10, projects 5, summary 5;
//!   each absent section adds a "Missing section" issue.
//! - Bullets: min(15, 2 × bullets); zero bullets adds an advisory.
//! - Formatting: "table"/"grid" anywhere adds an advisory, no score change.
//! - Clamp to [0, 100], round.
//!
//! The raw maximum is 115, so the clamp is part of the contract.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ats::error::{AtsError, AtsResult};
use crate::ats::sections::{SectionKind, SectionPresence};

pub const ISSUE_TOO_SHORT: &str = "Resume content is too short. Add substantive details.";
pub const ISSUE_LIGHT: &str = "Content is light. Consider more detail.";
pub const ISSUE_LONG: &str = "Content is long. Consider concise bullets.";
pub const ISSUE_NO_BULLETS: &str = "Use bullet points for readability.";
pub const ISSUE_TABLES: &str = "Avoid tables; many ATS struggle to parse them.";

/// Hard bounds of every reported score, whatever the configured range.
pub const SCORE_FLOOR: f64 = 0.0;
pub const SCORE_CEILING: f64 = 100.0;

pub fn missing_section_issue(kind: SectionKind) -> String {
    format!("Missing section: {}", kind.name())
}

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub min_words: usize,
    pub floor: f64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            min_words: 20,
            floor: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthConfig {
    pub light_below: usize,
    pub long_above: usize,
    pub light_points: f64,
    pub standard_points: f64,
    pub long_points: f64,
}

impl Default for LengthConfig {
    fn default() -> Self {
        Self {
            light_below: 150,
            long_above: 800,
            light_points: 20.0,
            standard_points: 35.0,
            long_points: 25.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionWeights {
    pub contact: f64,
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
    pub projects: f64,
    pub summary: f64,
}

impl Default for SectionWeights {
    fn default() -> Self {
        Self {
            contact: 10.0,
            skills: 15.0,
            experience: 20.0,
            education: 10.0,
            projects: 5.0,
            summary: 5.0,
        }
    }
}

impl SectionWeights {
    pub fn get(&self, kind: SectionKind) -> f64 {
        match kind {
            SectionKind::Contact => self.contact,
            SectionKind::Skills => self.skills,
            SectionKind::Experience => self.experience,
            SectionKind::Education => self.education,
            SectionKind::Projects => self.projects,
            SectionKind::Summary => self.summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    pub points_per_bullet: f64,
    pub max_points: f64,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            points_per_bullet: 2.0,
            max_points: 15.0,
        }
    }
}

/// Every weight, threshold and marker the scorer uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub guard: GuardConfig,
    pub length: LengthConfig,
    pub section_weights: SectionWeights,
    pub bullets: BulletConfig,
    pub formatting_markers: Vec<String>,
    pub min_score: f64,
    pub max_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            guard: GuardConfig::default(),
            length: LengthConfig::default(),
            section_weights: SectionWeights::default(),
            bullets: BulletConfig::default(),
            formatting_markers: vec!["table".to_string(), "grid".to_string()],
            min_score: 0.0,
            max_score: 100.0,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> AtsResult<()> {
        let numbers = [
            ("guard.floor", self.guard.floor),
            ("length.light_points", self.length.light_points),
            ("length.standard_points", self.length.standard_points),
            ("length.long_points", self.length.long_points),
            ("bullets.points_per_bullet", self.bullets.points_per_bullet),
            ("bullets.max_points", self.bullets.max_points),
            ("min_score", self.min_score),
            ("max_score", self.max_score),
        ];
        let weights = SectionKind::ALL
            .into_iter()
            .map(|k| (k.name(), self.section_weights.get(k)));

        for (name, value) in numbers.into_iter().chain(weights) {
            if !value.is_finite() {
                return Err(AtsError::Config(format!("{name} must be a finite number")));
            }
        }
        if self.min_score < SCORE_FLOOR
            || self.max_score > SCORE_CEILING
            || self.min_score > self.max_score
        {
            return Err(AtsError::Config(format!(
                "score bounds [{}, {}] are invalid",
                self.min_score, self.max_score
            )));
        }
        if self.length.light_below > self.length.long_above {
            return Err(AtsError::Config(
                "length.light_below must not exceed length.long_above".to_string(),
            ));
        }
        if self.formatting_markers.iter().any(|m| m.is_empty()) {
            return Err(AtsError::Config(
                "formatting markers must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

/// Which rule set produced the score. Guard scores are `max(floor, words)` and are
/// not comparable with full-path scores even though both land in 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorePath {
    Guard,
    Full,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    pub score: u32,
    pub issues: Vec<String>,
    pub path: ScorePath,
}

pub fn compute_score(
    text: &str,
    word_count: usize,
    sections: &SectionPresence,
    bullet_count: usize,
    config: &ScoringConfig,
) -> AtsResult<ScoreOutcome> {
    if word_count < config.guard.min_words {
        let raw = config.guard.floor.max(word_count as f64);
        debug!(word_count, raw, "Short content, guard path");
        return Ok(ScoreOutcome {
            score: finalize(raw, config)?,
            issues: vec![ISSUE_TOO_SHORT.to_string()],
            path: ScorePath::Guard,
        });
    }

    let mut raw = 0.0_f64;
    let mut issues = Vec::new();

    let length = &config.length;
    if word_count < length.light_below {
        raw += length.light_points;
        issues.push(ISSUE_LIGHT.to_string());
    } else if word_count <= length.long_above {
        raw += length.standard_points;
    } else {
        raw += length.long_points;
        issues.push(ISSUE_LONG.to_string());
    }

    for (kind, present) in sections.iter() {
        if present {
            raw += config.section_weights.get(kind);
        } else {
            issues.push(missing_section_issue(kind));
        }
    }

    if bullet_count == 0 {
        issues.push(ISSUE_NO_BULLETS.to_string());
    }
    raw += (bullet_count as f64 * config.bullets.points_per_bullet).min(config.bullets.max_points);

    let lowered = text.to_lowercase();
    if config
        .formatting_markers
        .iter()
        .any(|m| lowered.contains(&m.to_lowercase()))
    {
        issues.push(ISSUE_TABLES.to_string());
    }

    debug!(word_count, bullet_count, raw, "Full scoring path");
    Ok(ScoreOutcome {
        score: finalize(raw, config)?,
        issues,
        path: ScorePath::Full,
    })
}

fn finalize(raw: f64, config: &ScoringConfig) -> AtsResult<u32> {
    if !raw.is_finite() {
        return Err(AtsError::Analysis(format!(
            "score total is not a finite number ({raw})"
        )));
    }
    // f64::clamp panics on inverted bounds
    let clamped = raw
        .max(config.min_score.max(SCORE_FLOOR))
        .min(config.max_score.min(SCORE_CEILING))
        .max(SCORE_FLOOR);
    Ok(clamped.round() as u32)
}
