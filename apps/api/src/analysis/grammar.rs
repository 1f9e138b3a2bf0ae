//! Grammar/spelling subscore from spans flagged by the grammar-check collaborator.

use serde::{Deserialize, Serialize};

use crate::analysis::scorer::{Scorer, ScorerOutput};
use crate::models::{
    ComponentScore, Dimension, Issue, IssueCategory, NormalizedDocument, Severity, TextRange,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrammarCategory {
    Spelling,
    Grammar,
    Punctuation,
    Typography,
    Style,
    Other,
}

impl GrammarCategory {
    /// Penalty weight; also the priority when flagged spans overlap.
    pub fn weight(&self) -> f64 {
        match self {
            GrammarCategory::Spelling => 3.0,
            GrammarCategory::Grammar => 2.5,
            GrammarCategory::Punctuation => 1.5,
            GrammarCategory::Typography | GrammarCategory::Style | GrammarCategory::Other => 1.0,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            GrammarCategory::Spelling | GrammarCategory::Grammar => Severity::High,
            GrammarCategory::Punctuation => Severity::Medium,
            GrammarCategory::Typography | GrammarCategory::Style | GrammarCategory::Other => {
                Severity::Low
            }
        }
    }
}

/// One span flagged by the grammar-check collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedSpan {
    pub range: TextRange,
    pub category: GrammarCategory,
    pub message: String,
    #[serde(default)]
    pub suggestion: Option<String>,
}

/// Collaborator output as the scorer sees it. `Unavailable` degrades the
/// dimension instead of failing the analysis.
#[derive(Debug, Clone)]
pub enum GrammarFlags {
    Available(Vec<FlaggedSpan>),
    Unavailable { reason: String },
}

pub struct GrammarScorer<'a> {
    flags: &'a GrammarFlags,
    penalty_per_point: f64,
}

impl<'a> GrammarScorer<'a> {
    pub fn new(flags: &'a GrammarFlags, penalty_per_point: f64) -> Self {
        Self {
            flags,
            penalty_per_point,
        }
    }
}

impl Scorer for GrammarScorer<'_> {
    fn dimension(&self) -> Dimension {
        Dimension::Grammar
    }

    fn score(&self, doc: &NormalizedDocument) -> ScorerOutput {
        let spans = match self.flags {
            GrammarFlags::Available(spans) => spans,
            GrammarFlags::Unavailable { reason } => {
                tracing::warn!("Grammar dimension unavailable: {reason}");
                return ScorerOutput::new(ComponentScore::unavailable(Dimension::Grammar), vec![])
                    .metric("available", 0.0);
            }
        };

        let kept = select_spans(&doc.raw_text, spans);
        let weighted: f64 = kept.iter().map(|s| s.category.weight()).sum();
        let value = 100.0 - (self.penalty_per_point * weighted).min(100.0);

        let issues = kept
            .iter()
            .map(|span| {
                Issue::at_span(
                    IssueCategory::Grammar,
                    span.category.severity(),
                    span.range,
                    span.message.clone(),
                    span.suggestion.clone(),
                )
            })
            .collect::<Vec<_>>();

        ScorerOutput::new(ComponentScore::new(Dimension::Grammar, value), issues)
            .metric("available", 1.0)
            .metric("flagged_spans", spans.len() as f64)
            .metric("issues", kept.len() as f64)
            .metric("weighted_points", weighted)
    }
}

/// Drops spans that do not fit the document, exact repeats, and spans
/// overlapping a strictly higher-priority kept span. Equal-priority overlaps
/// are all kept. Result is in document order.
fn select_spans<'s>(raw: &str, spans: &'s [FlaggedSpan]) -> Vec<&'s FlaggedSpan> {
    let mut candidates: Vec<&FlaggedSpan> = spans
        .iter()
        .filter(|s| {
            let ok = !s.range.is_empty() && s.range.is_valid_in(raw);
            if !ok {
                tracing::warn!(
                    "Dropping flagged span {}..{} outside the document",
                    s.range.start,
                    s.range.end
                );
            }
            ok
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.category
            .weight()
            .total_cmp(&a.category.weight())
            .then(a.range.cmp(&b.range))
    });

    let mut kept: Vec<&FlaggedSpan> = Vec::with_capacity(candidates.len());
    for span in candidates {
        let repeat = kept
            .iter()
            .any(|k| k.range == span.range && k.category == span.category);
        let covered = kept.iter().any(|k| {
            k.category.weight() > span.category.weight() && k.range.intersects(&span.range)
        });
        if !(repeat || covered) {
            kept.push(span);
        }
    }
    kept.sort_by_key(|s| s.range);
    kept
}
