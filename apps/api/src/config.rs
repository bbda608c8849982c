use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::ats::analyzer::{AnalyzerConfig, DEFAULT_EXTRACTION_TIMEOUT};
use crate::ats::scoring::ScoringConfig;
use crate::ats::sections::SectionPatternConfig;

/// 5 MiB, the upload cap of the résumé form.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    pub extraction_timeout: Duration,
    /// Optional JSON file overriding scoring weights and section patterns.
    pub scoring_profile_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            extraction_timeout: DEFAULT_EXTRACTION_TIMEOUT,
            scoring_profile_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            extraction_timeout: extraction_timeout_from_secs(parse_env(
                "EXTRACTION_TIMEOUT_SECS",
                defaults.extraction_timeout.as_secs(),
            )?)
            .context("EXTRACTION_TIMEOUT_SECS is invalid")?,
            scoring_profile_path: std::env::var("ATS_SCORING_CONFIG").ok().map(PathBuf::from),
        })
    }

    /// Builds the analyzer configuration, reading the scoring profile if one is set.
    pub fn analyzer_config(&self) -> Result<AnalyzerConfig> {
        let profile = match &self.scoring_profile_path {
            Some(path) => load_scoring_profile(path)?,
            None => ScoringProfile::default(),
        };
        Ok(AnalyzerConfig {
            scoring: profile.scoring,
            sections: profile.sections,
            extraction_timeout: self.extraction_timeout,
        })
    }
}

/// On-disk shape of `ATS_SCORING_CONFIG`. Either half may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoringProfile {
    pub scoring: ScoringConfig,
    pub sections: SectionPatternConfig,
}

pub fn load_scoring_profile(path: &Path) -> Result<ScoringProfile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scoring profile {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Scoring profile {} is not valid JSON", path.display()))
}

/// A zero timeout would fail every extraction before it starts.
fn extraction_timeout_from_secs(secs: u64) -> Result<Duration> {
    if secs == 0 {
        bail!("extraction timeout must be at least 1 second");
    }
    Ok(Duration::from_secs(secs))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
