use std::sync::Arc;

use crate::ats::analyzer::Analyzer;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Stateless document-to-score pipeline, shared across requests.
    pub analyzer: Arc<Analyzer>,
}
