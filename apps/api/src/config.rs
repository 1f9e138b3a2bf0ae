use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::aggregator::DimensionWeights;
use crate::analysis::structure::StructurePoints;
use crate::feedback::SeverityThresholds;

/// Application configuration loaded from environment variables.
/// Startup fails if any recognized variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// `None` when no grammar-check collaborator is configured.
    pub grammar_check: Option<GrammarCheckConfig>,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone)]
pub struct GrammarCheckConfig {
    pub base_url: String,
    pub language: String,
    pub timeout_secs: u64,
}

/// Tunables for the analysis pipeline. Defaults are the service defaults;
/// tests build their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub dimension_weights: DimensionWeights,
    pub severity_thresholds: SeverityThresholds,
    pub max_details_per_section: usize,
    pub keyword_sets: Vec<String>,
    /// Upper bound on `raw_text`, in characters.
    pub max_document_length: usize,
    /// Grammar subscore lost per weighted flagged span.
    pub grammar_penalty_per_point: f64,
    /// Language-strength points lost per weak match per sentence.
    pub weak_phrase_density_scale: f64,
    pub structure: StructurePoints,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            dimension_weights: DimensionWeights::default(),
            severity_thresholds: SeverityThresholds::default(),
            max_details_per_section: 5,
            keyword_sets: vec!["general".to_string()],
            max_document_length: 50_000,
            grammar_penalty_per_point: 5.0,
            weak_phrase_density_scale: 40.0,
            structure: StructurePoints::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        self.dimension_weights.validate()?;
        self.severity_thresholds.validate()?;
        self.structure.validate()?;
        if self.max_details_per_section == 0 {
            bail!("max_details_per_section must be at least 1");
        }
        if self.max_document_length == 0 {
            bail!("max_document_length must be at least 1");
        }
        if self.keyword_sets.is_empty() {
            bail!("at least one keyword set must be active");
        }
        if self.grammar_penalty_per_point < 0.0 || self.weak_phrase_density_scale < 0.0 {
            bail!("penalty scales must be non-negative");
        }
        Ok(())
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = AnalysisConfig::default();

        let dimension_weights = match optional_env("DIMENSION_WEIGHTS") {
            Some(raw) => DimensionWeights::parse(&raw).context("DIMENSION_WEIGHTS is invalid")?,
            None => defaults.dimension_weights.clone(),
        };
        let severity_thresholds = match optional_env("SEVERITY_THRESHOLDS") {
            Some(raw) => {
                SeverityThresholds::parse(&raw).context("SEVERITY_THRESHOLDS is invalid")?
            }
            None => defaults.severity_thresholds.clone(),
        };
        let keyword_sets = match optional_env("KEYWORD_SETS") {
            Some(raw) => parse_list(&raw),
            None => defaults.keyword_sets.clone(),
        };

        let analysis = AnalysisConfig {
            dimension_weights,
            severity_thresholds,
            max_details_per_section: parse_env(
                "MAX_DETAILS_PER_SECTION",
                defaults.max_details_per_section,
            )?,
            keyword_sets,
            max_document_length: parse_env("MAX_DOCUMENT_LENGTH", defaults.max_document_length)?,
            ..defaults
        };
        analysis.validate().context("Analysis configuration is invalid")?;

        let grammar_check = match optional_env("GRAMMAR_CHECK_URL") {
            Some(base_url) => Some(GrammarCheckConfig {
                base_url,
                language: optional_env("GRAMMAR_CHECK_LANGUAGE")
                    .unwrap_or_else(|| "en-US".to_string()),
                timeout_secs: parse_env("GRAMMAR_CHECK_TIMEOUT_SECS", 10)?,
            }),
            None => None,
        };

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            grammar_check,
            analysis,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

/// Splits a comma-separated list, dropping blanks.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
