//! Rewrites weak phrasing in place without disturbing the document layout.
//!
//! Only language-strength and keyword issues carry edits the rewriter will
//! apply. Grammar and structure findings are informational.

use serde::{Deserialize, Serialize};

use crate::analysis::keywords::KeywordScorer;
use crate::analysis::language::LanguageStrengthScorer;
use crate::analysis::pipeline::{prepare, score_document, AnalysisContext};
use crate::analysis::scorer::Scorer;
use crate::errors::AnalysisError;
use crate::models::ExtractedDocument;

pub mod apply;
pub mod handlers;
pub mod plan;
pub mod units;

pub use apply::{apply_plan, OutputUnit};
pub use plan::{build_plan, RewritePlan, SkippedEdit};

/// The edited document plus the plan that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteOutput {
    pub text: String,
    pub units: Vec<OutputUnit>,
    pub plan: RewritePlan,
    pub skipped: Vec<SkippedEdit>,
}

/// Either the whole edited document or an error; never a partial rewrite.
pub fn rewrite(
    document: &ExtractedDocument,
    ctx: AnalysisContext<'_>,
) -> Result<RewriteOutput, AnalysisError> {
    let raw = document.raw_text.as_str();
    let normalized = prepare(raw, ctx.config)?;

    let scorers: Vec<Box<dyn Scorer + '_>> = vec![
        Box::new(LanguageStrengthScorer::new(
            ctx.lexicon,
            ctx.config.weak_phrase_density_scale,
        )),
        Box::new(KeywordScorer::new(ctx.keywords)),
    ];
    let (_, issues, _) = score_document(&normalized, &scorers);

    let units = units::resolve_units(raw, &document.structural_units);
    let (plan, skipped) = build_plan(raw, &issues, &units)?;
    let (text, units) = apply_plan(raw, &plan, &units);

    if plan.is_empty() {
        tracing::debug!("Rewrite found nothing to change ({} skipped)", skipped.len());
    } else {
        tracing::debug!(
            "Rewrite applied {} edit(s), skipped {}, across {} unit(s)",
            plan.edits.len(),
            skipped.len(),
            units.len()
        );
    }

    Ok(RewriteOutput {
        text,
        units,
        plan,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::config::AnalysisConfig;
    use crate::lexicon::{KeywordBank, KeywordEntry, Lexicon};
    use crate::models::{StructuralUnit, TextRange};
    use crate::rewrite::plan::SkipReason;
    use crate::rewrite::units::containing_unit;

    const RESUME: &str = "Jane Doe\njane@example.com\n\
        SUMMARY\nBackend engineer with leadership experience.\n\
        EXPERIENCE\n\
        • I was responsible for managing a team.\n\
        • Designed billing services.\n\
        • Mentored four engineers.\n\
        EDUCATION\n• BSc Computer Science, 2015.\n\
        SKILLS\nRust, SQL, leadership.";

    fn make_bank() -> KeywordBank {
        KeywordBank::new(vec![
            KeywordEntry::new("leadership", true, &[]),
            KeywordEntry::new("SQL", true, &[]),
            KeywordEntry::new("Kubernetes", true, &["k8s"]),
        ])
    }

    fn run(document: &ExtractedDocument) -> Result<RewriteOutput, AnalysisError> {
        let config = AnalysisConfig::default();
        let lexicon = Lexicon::english();
        let keywords = make_bank();
        let ctx = AnalysisContext {
            config: &config,
            lexicon: &lexicon,
            keywords: &keywords,
        };
        rewrite(document, ctx)
    }

    #[test]
    fn test_only_the_weak_span_is_replaced() {
        let out = run(&ExtractedDocument::from_text(RESUME)).unwrap();
        assert_eq!(out.plan.edits.len(), 1);
        assert_eq!(out.plan.edits[0].original, "responsible for");
        assert_eq!(
            out.text,
            RESUME.replace("responsible for", "managed")
        );
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let first = run(&ExtractedDocument::from_text(RESUME)).unwrap();
        let second = run(&ExtractedDocument::from_text(first.text.clone())).unwrap();
        assert!(second.plan.is_empty());
        assert_eq!(second.text, first.text);
    }

    #[test]
    fn test_keyword_variant_is_upgraded() {
        let out = run(&ExtractedDocument::from_text("Deployed k8s clusters.")).unwrap();
        assert_eq!(out.text, "Deployed Kubernetes clusters.");
        assert_eq!(out.units[0].text, out.text);
    }

    #[test]
    fn test_supplied_unit_split_blocks_edit() {
        let raw = "I helped with onboarding.";
        // Unit boundary falls between "helped" and "with".
        let document = ExtractedDocument {
            raw_text: raw.to_string(),
            structural_units: vec![
                StructuralUnit {
                    unit_id: "run-1".to_string(),
                    range: TextRange::new(0, 9),
                },
                StructuralUnit {
                    unit_id: "run-2".to_string(),
                    range: TextRange::new(9, raw.len()),
                },
            ],
        };
        let out = run(&document).unwrap();
        assert!(out.plan.is_empty());
        assert_eq!(out.text, raw);
        assert_eq!(out.skipped[0].reason, SkipReason::CrossesUnitBoundary);
        assert_eq!(out.units[1].unit_id, "run-2");
    }

    #[test]
    fn test_oversized_document_is_rejected() {
        let config = AnalysisConfig {
            max_document_length: 5,
            ..AnalysisConfig::default()
        };
        let lexicon = Lexicon::english();
        let keywords = make_bank();
        let ctx = AnalysisContext {
            config: &config,
            lexicon: &lexicon,
            keywords: &keywords,
        };
        let err = rewrite(&ExtractedDocument::from_text(RESUME), ctx).unwrap_err();
        assert!(matches!(err, AnalysisError::DocumentTooLarge { .. }));
    }

    const WORDS: &[&str] = &[
        "I", "was", "responsible", "for", "helped", "with", "good", "team", "k8s", "managed",
        "results", "very", "in", "charge", "of", "involved", "Good", "things",
    ];

    /// Contiguous units covering the whole text, split at `cuts`.
    fn make_units(len: usize, cuts: &[usize]) -> Vec<StructuralUnit> {
        let mut bounds: Vec<usize> = cuts.iter().map(|c| c % (len + 1)).collect();
        bounds.push(0);
        bounds.push(len);
        bounds.sort_unstable();
        bounds.dedup();
        bounds
            .windows(2)
            .enumerate()
            .map(|(i, w)| StructuralUnit {
                unit_id: format!("u{i}"),
                range: TextRange::new(w[0], w[1]),
            })
            .collect()
    }

    proptest! {
        #[test]
        fn test_plan_respects_unit_boundaries(
            words in prop::collection::vec(prop::sample::select(WORDS), 1..40),
            newlines in prop::collection::vec(any::<bool>(), 40),
            cuts in prop::collection::vec(0usize..400, 0..8),
        ) {
            let mut raw = String::new();
            for (i, word) in words.iter().enumerate() {
                if i > 0 {
                    raw.push(if newlines[i] { '\n' } else { ' ' });
                }
                raw.push_str(word);
            }
            let units = make_units(raw.len(), &cuts);
            let document = ExtractedDocument {
                raw_text: raw.clone(),
                structural_units: units.clone(),
            };

            let out = run(&document).unwrap();

            for pair in out.plan.edits.windows(2) {
                prop_assert!(pair[0].range.end <= pair[1].range.start);
            }
            for edit in &out.plan.edits {
                prop_assert!(containing_unit(&units, &edit.range).is_some());
                prop_assert_eq!(edit.range.slice(&raw), edit.original.as_str());
            }
            let rebuilt: String = out.units.iter().map(|u| u.text.as_str()).collect();
            prop_assert_eq!(rebuilt, out.text.clone());
            for unit in &out.units {
                prop_assert_eq!(unit.range.slice(&out.text), unit.text.as_str());
            }

            // Same unit layout over the rewritten text: nothing left to change.
            let again = ExtractedDocument {
                raw_text: out.text.clone(),
                structural_units: out
                    .units
                    .iter()
                    .map(|u| StructuralUnit {
                        unit_id: u.unit_id.clone(),
                        range: u.range,
                    })
                    .collect(),
            };
            let second = run(&again).unwrap();
            prop_assert!(second.plan.is_empty(), "{:?}", second.plan.edits);
            prop_assert_eq!(second.text, out.text);
        }
    }
}
