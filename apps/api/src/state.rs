use std::sync::Arc;

use anyhow::anyhow;

use crate::analysis::pipeline::AnalysisContext;
use crate::config::Config;
use crate::errors::{AnalysisError, AppError};
use crate::grammar_client::GrammarChecker;
use crate::lexicon::{KeywordBank, Lexicon};

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub lexicon: Arc<Lexicon>,
    /// Entries of the keyword sets named in `KEYWORD_SETS`.
    pub keywords: Arc<KeywordBank>,
    /// LanguageTool client, or the disabled checker when no URL is configured.
    pub grammar: Arc<dyn GrammarChecker>,
}

impl AppState {
    pub fn analysis_context(&self) -> AnalysisContext<'_> {
        AnalysisContext {
            config: &self.config.analysis,
            lexicon: &self.lexicon,
            keywords: &self.keywords,
        }
    }

    /// Runs a CPU-bound pipeline job on the blocking pool.
    pub async fn run_pipeline<T, F>(&self, job: F) -> Result<T, AppError>
    where
        F: FnOnce(AnalysisContext<'_>) -> Result<T, AnalysisError> + Send + 'static,
        T: Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || job(state.analysis_context()))
            .await
            .map_err(|e| anyhow!("pipeline task failed: {e}"))?
            .map_err(AppError::from)
    }
}
