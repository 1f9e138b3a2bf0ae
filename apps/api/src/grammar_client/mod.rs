//! Grammar-check client: the only module that talks to the grammar/spelling
//! collaborator. Speaks the LanguageTool `/v2/check` protocol.
//!
//! Handlers never see transport errors: a failed check is reported as
//! `GrammarFlags::Unavailable` and the grammar dimension degrades.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::analysis::grammar::{FlaggedSpan, GrammarCategory, GrammarFlags};
use crate::config::GrammarCheckConfig;
use crate::errors::AnalysisError;
use crate::models::TextRange;

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum GrammarCheckError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Grammar service error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Grammar service unavailable after {retries} attempts")]
    RetriesExhausted { retries: u32 },

    #[error("Grammar check is not configured")]
    NotConfigured,
}

impl From<GrammarCheckError> for AnalysisError {
    fn from(e: GrammarCheckError) -> Self {
        AnalysisError::CollaboratorUnavailable(e.to_string())
    }
}

/// Checks text and returns flagged spans with byte ranges into that text.
#[async_trait]
pub trait GrammarChecker: Send + Sync {
    async fn check(&self, text: &str) -> Result<Vec<FlaggedSpan>, GrammarCheckError>;
}

/// Runs the checker and folds any failure into `GrammarFlags::Unavailable`.
pub async fn collect_flags(checker: &dyn GrammarChecker, text: &str) -> GrammarFlags {
    match checker.check(text).await {
        Ok(spans) => GrammarFlags::Available(spans),
        Err(e) => {
            let err = AnalysisError::from(e);
            warn!("Grammar check failed, scoring without it ({}): {err}", err.kind());
            GrammarFlags::Unavailable {
                reason: err.to_string(),
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DisabledGrammarChecker
// ────────────────────────────────────────────────────────────────────────────

/// Used when no `GRAMMAR_CHECK_URL` is configured.
pub struct DisabledGrammarChecker;

#[async_trait]
impl GrammarChecker for DisabledGrammarChecker {
    async fn check(&self, _text: &str) -> Result<Vec<FlaggedSpan>, GrammarCheckError> {
        Err(GrammarCheckError::NotConfigured)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LanguageToolChecker
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    matches: Vec<RuleMatch>,
}

#[derive(Debug, Deserialize)]
struct RuleMatch {
    message: String,
    /// UTF-16 code units.
    offset: usize,
    length: usize,
    #[serde(default)]
    replacements: Vec<Replacement>,
    rule: Option<Rule>,
}

#[derive(Debug, Deserialize)]
struct Replacement {
    value: String,
}

#[derive(Debug, Deserialize)]
struct Rule {
    category: Option<RuleCategory>,
}

#[derive(Debug, Deserialize)]
struct RuleCategory {
    id: String,
}

#[derive(Clone)]
pub struct LanguageToolChecker {
    client: Client,
    check_url: String,
    language: String,
}

impl LanguageToolChecker {
    pub fn new(config: &GrammarCheckConfig) -> Result<Self, GrammarCheckError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            check_url: format!("{}/v2/check", config.base_url.trim_end_matches('/')),
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl GrammarChecker for LanguageToolChecker {
    /// Retries on 429 and 5xx with exponential backoff.
    async fn check(&self, text: &str) -> Result<Vec<FlaggedSpan>, GrammarCheckError> {
        let form = [("text", text), ("language", self.language.as_str())];
        let mut last_error: Option<GrammarCheckError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 250ms, 500ms
                let delay = Duration::from_millis(250 * (1 << (attempt - 1)));
                warn!(
                    "Grammar check attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(&self.check_url).form(&form).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(GrammarCheckError::Http(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Grammar service returned {}: {}", status, body);
                last_error = Some(GrammarCheckError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }
            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(GrammarCheckError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: CheckResponse = response.json().await?;
            let spans = to_flagged_spans(text, parsed.matches);
            debug!("Grammar check flagged {} span(s)", spans.len());
            return Ok(spans);
        }

        Err(last_error.unwrap_or(GrammarCheckError::RetriesExhausted {
            retries: MAX_RETRIES,
        }))
    }
}

fn category_for(id: Option<&str>) -> GrammarCategory {
    match id {
        Some("TYPOS") => GrammarCategory::Spelling,
        Some("GRAMMAR") | Some("CASING") => GrammarCategory::Grammar,
        Some("PUNCTUATION") => GrammarCategory::Punctuation,
        Some("TYPOGRAPHY") => GrammarCategory::Typography,
        Some("STYLE") | Some("REDUNDANCY") => GrammarCategory::Style,
        _ => GrammarCategory::Other,
    }
}

fn to_flagged_spans(text: &str, matches: Vec<RuleMatch>) -> Vec<FlaggedSpan> {
    let index = Utf16Index::new(text);
    matches
        .into_iter()
        .filter_map(|m| {
            let start = index.byte_offset(m.offset)?;
            let end = index.byte_offset(m.offset + m.length)?;
            let category = category_for(
                m.rule
                    .as_ref()
                    .and_then(|r| r.category.as_ref())
                    .map(|c| c.id.as_str()),
            );
            Some(FlaggedSpan {
                range: TextRange::new(start, end),
                category,
                message: m.message,
                suggestion: m.replacements.into_iter().next().map(|r| r.value),
            })
        })
        .collect()
}

/// Maps UTF-16 code-unit offsets to byte offsets.
struct Utf16Index {
    /// (utf16 offset, byte offset) at every char boundary, plus the end.
    boundaries: Vec<(usize, usize)>,
}

impl Utf16Index {
    fn new(text: &str) -> Self {
        let mut boundaries = Vec::with_capacity(text.len() + 1);
        let mut units = 0;
        for (byte, c) in text.char_indices() {
            boundaries.push((units, byte));
            units += c.len_utf16();
        }
        boundaries.push((units, text.len()));
        Self { boundaries }
    }

    /// `None` when the offset falls inside a surrogate pair or past the end.
    fn byte_offset(&self, utf16: usize) -> Option<usize> {
        self.boundaries
            .binary_search_by_key(&utf16, |&(u, _)| u)
            .ok()
            .map(|i| self.boundaries[i].1)
    }
}
