//! Building a `RewritePlan` from scorer issues.
//!
//! 1. collect span issues with a replacement from the rewritable categories
//! 2. skip no-ops and edits that do not sit inside one structural unit
//! 3. collapse identical duplicates
//! 4. resolve overlaps: higher severity wins, then the earlier edit; equally
//!    strong edits on the exact same span with different text are ambiguous
//! 5. sort by start offset

use serde::{Deserialize, Serialize};

use crate::errors::{AnalysisError, OverlapConflict};
use crate::models::{Issue, Severity, StructuralUnit, TextRange};
use crate::rewrite::units::containing_unit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edit {
    pub range: TextRange,
    pub original: String,
    pub replacement: String,
    pub severity: Severity,
}

/// Non-overlapping edits sorted by ascending start offset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewritePlan {
    pub edits: Vec<Edit>,
}

impl RewritePlan {
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoOp,
    OutsideDocument,
    CrossesUnitBoundary,
    OverlapsStrongerEdit,
}

/// A candidate edit that was not applied, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedEdit {
    pub range: TextRange,
    pub original: String,
    pub replacement: String,
    pub reason: SkipReason,
}

impl SkippedEdit {
    fn new(edit: Edit, reason: SkipReason) -> Self {
        Self {
            range: edit.range,
            original: edit.original,
            replacement: edit.replacement,
            reason,
        }
    }
}

pub fn build_plan(
    raw: &str,
    issues: &[Issue],
    units: &[StructuralUnit],
) -> Result<(RewritePlan, Vec<SkippedEdit>), AnalysisError> {
    let mut skipped = Vec::new();
    let mut candidates: Vec<Edit> = Vec::new();

    for issue in issues.iter().filter(|i| i.category.is_rewritable()) {
        let (Some(range), Some(replacement)) = (issue.span(), issue.suggestion.as_deref()) else {
            continue;
        };
        if replacement.is_empty() {
            continue;
        }
        let Some(original) = raw.get(range.start..range.end) else {
            skipped.push(SkippedEdit {
                range,
                original: String::new(),
                replacement: replacement.to_string(),
                reason: SkipReason::OutsideDocument,
            });
            continue;
        };
        let edit = Edit {
            range,
            original: original.to_string(),
            replacement: replacement.to_string(),
            severity: issue.severity,
        };
        if edit.original == edit.replacement {
            skipped.push(SkippedEdit::new(edit, SkipReason::NoOp));
            continue;
        }
        if containing_unit(units, &range).is_none() {
            tracing::warn!(
                "Skipping edit {}..{}: it crosses a structural-unit boundary",
                range.start,
                range.end
            );
            skipped.push(SkippedEdit::new(edit, SkipReason::CrossesUnitBoundary));
            continue;
        }
        candidates.push(edit);
    }

    candidates.sort_by(|a, b| {
        a.range
            .cmp(&b.range)
            .then_with(|| a.replacement.cmp(&b.replacement))
            .then(b.severity.cmp(&a.severity))
    });
    // Keeps the first, strongest, copy of each identical edit.
    candidates.dedup_by(|later, first| {
        later.range == first.range && later.replacement == first.replacement
    });
    // Strongest first; ties go to the earlier edit.
    candidates.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.range.cmp(&b.range)));

    let mut kept: Vec<Edit> = Vec::with_capacity(candidates.len());
    let mut conflicts: Vec<OverlapConflict> = Vec::new();
    for edit in candidates {
        let rival = kept.iter().position(|k| {
            k.range == edit.range
                && k.severity == edit.severity
                && k.replacement != edit.replacement
        });
        if let Some(i) = rival {
            record_conflict(&mut conflicts, &kept[i], edit);
            continue;
        }
        if kept.iter().any(|k| k.range.intersects(&edit.range)) {
            tracing::debug!(
                "Dropping edit {}..{} overlapping a stronger edit",
                edit.range.start,
                edit.range.end
            );
            skipped.push(SkippedEdit::new(edit, SkipReason::OverlapsStrongerEdit));
            continue;
        }
        kept.push(edit);
    }

    if !conflicts.is_empty() {
        return Err(AnalysisError::UnresolvableOverlap { conflicts });
    }

    kept.sort_by_key(|e| e.range);
    skipped.sort_by_key(|s| s.range);
    Ok((RewritePlan { edits: kept }, skipped))
}

fn record_conflict(conflicts: &mut Vec<OverlapConflict>, kept: &Edit, edit: Edit) {
    match conflicts.iter_mut().find(|c| c.range == edit.range) {
        Some(conflict) => conflict.replacements.push(edit.replacement),
        None => conflicts.push(OverlapConflict {
            range: edit.range,
            original: edit.original,
            replacements: vec![kept.replacement.clone(), edit.replacement],
        }),
    }
}
