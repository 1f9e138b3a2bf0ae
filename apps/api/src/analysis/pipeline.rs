//! One analysis run: size check → normalize → sections → scorers → aggregate.

use std::collections::BTreeMap;

use crate::analysis::aggregator::aggregate;
use crate::analysis::grammar::{GrammarFlags, GrammarScorer};
use crate::analysis::keywords::KeywordScorer;
use crate::analysis::language::LanguageStrengthScorer;
use crate::analysis::normalizer::{check_length, normalize};
use crate::analysis::scorer::{Scorer, ScorerOutput};
use crate::analysis::sections::detect_sections;
use crate::analysis::structure::StructureScorer;
use crate::config::AnalysisConfig;
use crate::errors::AnalysisError;
use crate::lexicon::{KeywordBank, Lexicon};
use crate::models::issue::sort_by_document_order;
use crate::models::{AnalysisResult, ComponentScores, Dimension, Issue, NormalizedDocument};

pub type DimensionMetrics = BTreeMap<Dimension, BTreeMap<String, f64>>;

/// Read-only resources shared by every run. Built once at startup; tests
/// build their own with small lexicons.
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub config: &'a AnalysisConfig,
    pub lexicon: &'a Lexicon,
    pub keywords: &'a KeywordBank,
}

/// Everything one analysis produces.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub document: NormalizedDocument,
    pub result: AnalysisResult,
}

/// Size check, normalization and section detection. Nothing else runs if
/// the document is too large.
pub fn prepare(
    raw_text: &str,
    config: &AnalysisConfig,
) -> Result<NormalizedDocument, AnalysisError> {
    check_length(raw_text, config.max_document_length)?;
    let sentences = normalize(raw_text)?;
    let sections = detect_sections(&sentences);
    Ok(NormalizedDocument {
        raw_text: raw_text.to_string(),
        sentences,
        sections,
    })
}

/// Runs every scorer over the document and merges their output.
pub fn score_document(
    document: &NormalizedDocument,
    scorers: &[Box<dyn Scorer + '_>],
) -> (ComponentScores, Vec<Issue>, DimensionMetrics) {
    let mut scores = ComponentScores::unmeasured();
    let mut issues = Vec::new();
    let mut metrics = BTreeMap::new();

    for scorer in scorers {
        let ScorerOutput {
            score,
            issues: found,
            metrics: m,
        } = scorer.score(document);
        debug_assert_eq!(score.dimension, scorer.dimension());
        tracing::debug!(
            "{} scored {:.1} with {} issue(s)",
            scorer.dimension(),
            score.value,
            found.len()
        );
        *scores.get_mut(scorer.dimension()) = score;
        issues.extend(found);
        metrics.insert(scorer.dimension(), m);
    }

    sort_by_document_order(&mut issues);
    (scores, issues, metrics)
}

pub fn analyze(
    raw_text: &str,
    grammar: &GrammarFlags,
    ctx: AnalysisContext<'_>,
) -> Result<Analysis, AnalysisError> {
    let document = prepare(raw_text, ctx.config)?;
    let cfg = ctx.config;

    let scorers: Vec<Box<dyn Scorer + '_>> = vec![
        Box::new(GrammarScorer::new(grammar, cfg.grammar_penalty_per_point)),
        Box::new(StructureScorer::new(&cfg.structure)),
        Box::new(LanguageStrengthScorer::new(
            ctx.lexicon,
            cfg.weak_phrase_density_scale,
        )),
        Box::new(KeywordScorer::new(ctx.keywords)),
    ];

    let (measured, all_issues, dimension_metrics) = score_document(&document, &scorers);
    let (component_scores, overall_score) = aggregate(&measured, &cfg.dimension_weights);

    tracing::debug!(
        "Analysis complete: {} sentences, {} sections, {} issues, overall {overall_score}",
        document.sentences.len(),
        document.sections.len(),
        all_issues.len()
    );

    Ok(Analysis {
        document,
        result: AnalysisResult {
            overall_score,
            component_scores,
            all_issues,
            dimension_metrics,
        },
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::analysis::grammar::{FlaggedSpan, GrammarCategory};
    use crate::lexicon::KeywordEntry;
    use crate::models::{IssueCategory, TextRange};

    const COMPLETE_RESUME: &str = "Jane Doe\njane@example.com\n\
        SUMMARY\nBackend engineer with leadership experience.\n\
        EXPERIENCE\n\
        • I was responsible for managing a team.\n\
        • Designed billing services.\n\
        • Reduced latency by 40%.\n\
        • Migrated storage to Postgres.\n\
        • Mentored four engineers.\n\
        • Automated deployments.\n\
        • Built internal tooling.\n\
        EDUCATION\n• BSc Computer Science, 2015.\n\
        SKILLS\nRust, SQL, leadership.";

    fn make_bank() -> KeywordBank {
        KeywordBank::new(vec![
            KeywordEntry::new("leadership", true, &[]),
            KeywordEntry::new("SQL", true, &[]),
        ])
    }

    fn run(raw: &str, grammar: &GrammarFlags) -> Result<Analysis, AnalysisError> {
        let config = AnalysisConfig::default();
        let lexicon = Lexicon::english();
        let keywords = make_bank();
        let ctx = AnalysisContext {
            config: &config,
            lexicon: &lexicon,
            keywords: &keywords,
        };
        analyze(raw, grammar, ctx)
    }

    #[test]
    fn test_weak_phrase_example_reduces_overall_score() {
        let analysis = run(COMPLETE_RESUME, &GrammarFlags::Available(vec![])).unwrap();
        let result = &analysis.result;

        let weak: Vec<_> = result
            .all_issues
            .iter()
            .filter(|i| i.category == IssueCategory::WeakPhrase)
            .collect();
        assert_eq!(weak.len(), 1);
        assert_eq!(
            weak[0].span().unwrap().slice(COMPLETE_RESUME),
            "responsible for"
        );

        let scores = &result.component_scores;
        assert_eq!(scores.grammar.value, 100.0);
        assert_eq!(scores.keywords.value, 100.0);
        assert!(scores.language_strength.value < 100.0);
        assert!(result.overall_score < 100.0);
    }

    #[test]
    fn test_overall_is_weighted_sum_within_rounding() {
        let analysis = run(COMPLETE_RESUME, &GrammarFlags::Available(vec![])).unwrap();
        let result = &analysis.result;
        let weights = AnalysisConfig::default().dimension_weights;
        let expected: f64 = result
            .component_scores
            .iter()
            .map(|s| weights.weight(s.dimension) * s.value)
            .sum();
        assert!((result.overall_score - expected).abs() <= 0.05 + 1e-9);
        for score in result.component_scores.iter() {
            assert!((0.0..=100.0).contains(&score.value));
        }
    }

    #[test]
    fn test_too_large_rejected_before_scoring() {
        let config = AnalysisConfig {
            max_document_length: 10,
            ..AnalysisConfig::default()
        };
        let lexicon = Lexicon::english();
        let keywords = make_bank();
        let ctx = AnalysisContext {
            config: &config,
            lexicon: &lexicon,
            keywords: &keywords,
        };
        let err = analyze(COMPLETE_RESUME, &GrammarFlags::Available(vec![]), ctx).unwrap_err();
        assert!(matches!(err, AnalysisError::DocumentTooLarge { max: 10, .. }));
    }

    #[test]
    fn test_blank_document_is_extraction_empty() {
        let err = run(" \n\t\n", &GrammarFlags::Available(vec![])).unwrap_err();
        assert!(matches!(err, AnalysisError::ExtractionEmpty));
    }

    #[test]
    fn test_grammar_unavailable_still_produces_full_result() {
        let flags = GrammarFlags::Unavailable {
            reason: "connection refused".to_string(),
        };
        let result = run(COMPLETE_RESUME, &flags).unwrap().result;
        assert!(!result.component_scores.grammar.available);
        assert_eq!(result.component_scores.iter().count(), 4);
        assert_eq!(result.dimension_metrics[&Dimension::Grammar]["available"], 0.0);
    }

    #[test]
    fn test_issues_are_in_document_order() {
        let flags = GrammarFlags::Available(vec![FlaggedSpan {
            range: TextRange::new(0, 4),
            category: GrammarCategory::Spelling,
            message: "Possible misspelling".to_string(),
            suggestion: None,
        }]);
        let result = run(COMPLETE_RESUME, &flags).unwrap().result;
        let starts: Vec<usize> = result
            .all_issues
            .iter()
            .filter_map(|i| i.span())
            .map(|r| r.start)
            .collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
        assert_eq!(result.all_issues[0].category, IssueCategory::Grammar);
    }

    const LINE_WORDS: &[&str] = &[
        "EXPERIENCE", "EDUCATION", "SKILLS", "SUMMARY", "jane@example.com", "I", "was",
        "responsible", "for", "involved", "in", "led", "SQL", "leadership", "good", "very",
        "teams", "2019", "Managed", "helped", "with", "results.", "Shipped", "a", "platform",
    ];

    fn make_text(lines: &[(bool, Vec<&str>)]) -> String {
        lines
            .iter()
            .map(|(bullet, words)| {
                let body = words.join(" ");
                if *bullet {
                    format!("• {body}")
                } else {
                    body
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    proptest! {
        #[test]
        fn test_scores_stay_in_range_and_sum_to_overall(
            lines in prop::collection::vec(
                (any::<bool>(), prop::collection::vec(prop::sample::select(LINE_WORDS), 1..8)),
                1..30,
            ),
            grammar_available in any::<bool>(),
        ) {
            let raw = make_text(&lines);
            let flags = if grammar_available {
                GrammarFlags::Available(vec![])
            } else {
                GrammarFlags::Unavailable { reason: "offline".to_string() }
            };
            let result = run(&raw, &flags).unwrap().result;

            let weights = AnalysisConfig::default().dimension_weights;
            let mut expected = 0.0;
            for score in result.component_scores.iter() {
                prop_assert!((0.0..=100.0).contains(&score.value), "{:?}", score);
                expected += weights.weight(score.dimension) * score.value;
            }
            prop_assert!((0.0..=100.0).contains(&result.overall_score));
            prop_assert!((result.overall_score - expected).abs() <= 0.05 + 1e-9);
        }
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let a = run(COMPLETE_RESUME, &GrammarFlags::Available(vec![])).unwrap();
        let b = run(COMPLETE_RESUME, &GrammarFlags::Available(vec![])).unwrap();
        assert_eq!(a.result.overall_score, b.result.overall_score);
        assert_eq!(a.result.all_issues, b.result.all_issues);
    }
}
