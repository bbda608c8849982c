use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::ats::error::{AtsError, AtsResult};

/// The six canonical résumé sections, in the order checks and issues are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Contact,
    Skills,
    Experience,
    Education,
    Projects,
    Summary,
}

impl SectionKind {
    pub const ALL: [SectionKind; 6] = [
        SectionKind::Contact,
        SectionKind::Skills,
        SectionKind::Experience,
        SectionKind::Education,
        SectionKind::Projects,
        SectionKind::Summary,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Contact => "contact",
            SectionKind::Skills => "skills",
            SectionKind::Experience => "experience",
            SectionKind::Education => "education",
            SectionKind::Projects => "projects",
            SectionKind::Summary => "summary",
        }
    }
}

/// Presence flag for every section. All six keys are always serialised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPresence {
    pub contact: bool,
    pub skills: bool,
    pub experience: bool,
    pub education: bool,
    pub projects: bool,
    pub summary: bool,
}

impl SectionPresence {
    pub fn get(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::Contact => self.contact,
            SectionKind::Skills => self.skills,
            SectionKind::Experience => self.experience,
            SectionKind::Education => self.education,
            SectionKind::Projects => self.projects,
            SectionKind::Summary => self.summary,
        }
    }

    fn set(&mut self, kind: SectionKind, present: bool) {
        let slot = match kind {
            SectionKind::Contact => &mut self.contact,
            SectionKind::Skills => &mut self.skills,
            SectionKind::Experience => &mut self.experience,
            SectionKind::Education => &mut self.education,
            SectionKind::Projects => &mut self.projects,
            SectionKind::Summary => &mut self.summary,
        };
        *slot = present;
    }

    /// Yields `(section, present)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (SectionKind, bool)> + '_ {
        SectionKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    pub fn missing(&self) -> Vec<SectionKind> {
        self.iter()
            .filter(|(_, present)| !present)
            .map(|(kind, _)| kind)
            .collect()
    }
}

/// Pattern source per section. Missing keys in a config file fall back to these defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionPatternConfig {
    pub contact: String,
    pub skills: String,
    pub experience: String,
    pub education: String,
    pub projects: String,
    pub summary: String,
}

impl Default for SectionPatternConfig {
    fn default() -> Self {
        Self {
            contact: r"email|phone|tel|address".to_string(),
            skills: r"skills|technical skills|key skills".to_string(),
            experience: r"experience|work history|employment".to_string(),
            education: r"education|degree|b\.?sc|m\.?sc|bachelor|master|university|college"
                .to_string(),
            projects: r"projects|publications".to_string(),
            summary: r"summary|profile|objective".to_string(),
        }
    }
}

impl SectionPatternConfig {
    pub fn pattern(&self, kind: SectionKind) -> &str {
        match kind {
            SectionKind::Contact => &self.contact,
            SectionKind::Skills => &self.skills,
            SectionKind::Experience => &self.experience,
            SectionKind::Education => &self.education,
            SectionKind::Projects => &self.projects,
            SectionKind::Summary => &self.summary,
        }
    }
}

/// Compiled, case-insensitive section patterns.
#[derive(Debug, Clone)]
pub struct SectionPatterns {
    patterns: Vec<(SectionKind, Regex)>,
}

impl SectionPatterns {
    pub fn compile(config: &SectionPatternConfig) -> AtsResult<Self> {
        let patterns = SectionKind::ALL
            .into_iter()
            .map(|kind| {
                RegexBuilder::new(config.pattern(kind))
                    .case_insensitive(true)
                    .build()
                    .map(|re| (kind, re))
                    .map_err(|e| {
                        AtsError::Config(format!("invalid pattern for section {}: {e}", kind.name()))
                    })
            })
            .collect::<AtsResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }
}

/// Tests every section pattern independently against the lowercased text.
/// No exclusivity and no positional requirement: a keyword anywhere counts.
pub fn detect_sections(text: &str, patterns: &SectionPatterns) -> SectionPresence {
    let lowered = text.to_lowercase();
    let mut presence = SectionPresence::default();
    for (kind, re) in &patterns.patterns {
        presence.set(*kind, re.is_match(&lowered));
    }
    presence
}
