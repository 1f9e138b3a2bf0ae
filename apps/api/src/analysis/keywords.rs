//! Keyword-coverage subscore.

use crate::analysis::scorer::{Scorer, ScorerOutput};
use crate::lexicon::keywords::match_parts;
use crate::lexicon::{KeywordBank, KeywordEntry};
use crate::models::{
    ComponentScore, Dimension, Issue, IssueCategory, Location, NormalizedDocument, SectionLabel,
    Sentence, Severity, TextRange,
};

pub struct KeywordScorer<'a> {
    bank: &'a KeywordBank,
}

impl<'a> KeywordScorer<'a> {
    pub fn new(bank: &'a KeywordBank) -> Self {
        Self { bank }
    }
}

/// Stemmed parts of every token, per sentence. Keywords never match across
/// sentence boundaries.
fn sentence_parts(sentences: &[Sentence]) -> Vec<Vec<String>> {
    sentences
        .iter()
        .map(|s| {
            s.tokens
                .iter()
                .flat_map(|t| match_parts(&t.normalized))
                .collect()
        })
        .collect()
}

fn contains_run(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Whole-token occurrences of `variant` (lowercase, space separated).
fn variant_occurrences(sentences: &[Sentence], variant: &str) -> Vec<TextRange> {
    let parts: Vec<&str> = variant.split_whitespace().collect();
    if parts.is_empty() {
        return Vec::new();
    }
    let mut found = Vec::new();
    for sentence in sentences {
        let tokens = &sentence.tokens;
        if tokens.len() < parts.len() {
            continue;
        }
        for start in 0..=tokens.len() - parts.len() {
            let window = &tokens[start..start + parts.len()];
            if window.iter().zip(&parts).all(|(t, p)| t.normalized == *p) {
                found.push(TextRange::new(
                    window[0].range.start,
                    window[parts.len() - 1].range.end,
                ));
            }
        }
    }
    found
}

/// Canonical spelling to put in place of an informal variant. A display form
/// with its own capitals (a product name) is used verbatim; otherwise the
/// variant's leading capital carries over.
fn variant_replacement(original: &str, display: &str) -> String {
    if display.chars().any(char::is_uppercase) {
        return display.to_string();
    }
    let mut chars = display.chars();
    match (original.chars().next(), chars.next()) {
        (Some(o), Some(first)) if o.is_uppercase() => first.to_uppercase().chain(chars).collect(),
        _ => display.to_string(),
    }
}

impl Scorer for KeywordScorer<'_> {
    fn dimension(&self) -> Dimension {
        Dimension::Keywords
    }

    fn score(&self, doc: &NormalizedDocument) -> ScorerOutput {
        let parts = sentence_parts(&doc.sentences);
        let total = self.bank.entries.len();
        let mut found = 0usize;
        let mut variants_found = 0usize;
        let mut issues = Vec::new();

        for entry in &self.bank.entries {
            let needle = entry.match_parts();
            if parts.iter().any(|p| contains_run(p, &needle)) {
                found += 1;
                continue;
            }

            let occurrences: Vec<TextRange> = entry
                .variants
                .iter()
                .flat_map(|v| variant_occurrences(&doc.sentences, v))
                .collect();
            if occurrences.is_empty() {
                if entry.high_value {
                    issues.push(missing_keyword_issue(entry));
                }
                continue;
            }

            variants_found += 1;
            let severity = if entry.high_value {
                Severity::Medium
            } else {
                Severity::Low
            };
            for range in occurrences {
                let original = range.slice(&doc.raw_text);
                issues.push(Issue::at_span(
                    IssueCategory::MissingKeyword,
                    severity,
                    range,
                    format!(
                        "Use the standard term \"{}\" instead of \"{original}\"",
                        entry.display
                    ),
                    Some(variant_replacement(original, &entry.display)),
                ));
            }
        }

        let coverage = if total == 0 {
            1.0
        } else {
            found as f64 / total as f64
        };

        ScorerOutput::new(
            ComponentScore::new(Dimension::Keywords, coverage * 100.0),
            issues,
        )
        .metric("keywords_total", total as f64)
        .metric("keywords_found", found as f64)
        .metric("variants_found", variants_found as f64)
        .metric("coverage", coverage)
    }
}

fn missing_keyword_issue(entry: &KeywordEntry) -> Issue {
    Issue {
        category: IssueCategory::MissingKeyword,
        severity: Severity::Medium,
        location: Location::Section {
            label: SectionLabel::Skills,
        },
        message: format!("High-value keyword \"{}\" was not found", entry.display),
        suggestion: Some(entry.display.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalizer::normalize;

    fn make_doc(raw: &str) -> NormalizedDocument {
        NormalizedDocument {
            raw_text: raw.to_string(),
            sentences: normalize(raw).unwrap(),
            sections: vec![],
        }
    }

    fn make_bank() -> KeywordBank {
        KeywordBank::new(vec![
            KeywordEntry::new("leadership", true, &[]),
            KeywordEntry::new("problem-solving", false, &[]),
            KeywordEntry::new("Kubernetes", true, &["k8s"]),
            KeywordEntry::new("collaboration", false, &["teamwork", "team work"]),
        ])
    }

    #[test]
    fn test_coverage_uses_stemmed_parts() {
        let bank = make_bank();
        let doc = make_doc("Showed leadership and strong problem solving skills.");
        let out = KeywordScorer::new(&bank).score(&doc);
        assert_eq!(out.metrics["keywords_found"], 2.0);
        assert_eq!(out.score.value, 50.0);
    }

    #[test]
    fn test_variant_yields_span_issue_with_canonical_term() {
        let bank = make_bank();
        let raw = "Ran k8s clusters with great Teamwork.";
        let out = KeywordScorer::new(&bank).score(&make_doc(raw));
        let spans: Vec<_> = out.issues.iter().filter_map(|i| i.span()).collect();
        assert_eq!(spans.len(), 2);
        let k8s = out
            .issues
            .iter()
            .find(|i| i.span().map(|r| r.slice(raw)) == Some("k8s"))
            .unwrap();
        assert_eq!(k8s.suggestion.as_deref(), Some("Kubernetes"));
        let teamwork = out
            .issues
            .iter()
            .find(|i| i.span().map(|r| r.slice(raw)) == Some("Teamwork"))
            .unwrap();
        assert_eq!(teamwork.suggestion.as_deref(), Some("Collaboration"));
    }

    #[test]
    fn test_missing_high_value_keyword_points_at_skills() {
        let bank = make_bank();
        let out = KeywordScorer::new(&bank).score(&make_doc("Wrote code."));
        let leadership = out
            .issues
            .iter()
            .find(|i| i.suggestion.as_deref() == Some("leadership"))
            .unwrap();
        assert_eq!(
            leadership.location,
            Location::Section {
                label: SectionLabel::Skills
            }
        );
        // low-value keywords without variants are not reported
        assert!(!out
            .issues
            .iter()
            .any(|i| i.suggestion.as_deref() == Some("problem-solving")));
    }

    #[test]
    fn test_variant_match_is_whole_token() {
        let bank = make_bank();
        let out = KeywordScorer::new(&bank).score(&make_doc("Used k8sctl daily."));
        assert!(out.issues.iter().all(|i| i.span().is_none()));
    }

    #[test]
    fn test_multiword_variant() {
        let bank = make_bank();
        let raw = "Valued team work.";
        let out = KeywordScorer::new(&bank).score(&make_doc(raw));
        let issue = out.issues.iter().find(|i| i.span().is_some()).unwrap();
        assert_eq!(issue.span().unwrap().slice(raw), "team work");
    }

    #[test]
    fn test_empty_bank_is_full_coverage() {
        let bank = KeywordBank::new(vec![]);
        let out = KeywordScorer::new(&bank).score(&make_doc("Anything."));
        assert_eq!(out.score.value, 100.0);
    }

    #[test]
    fn test_variant_replacement_casing() {
        assert_eq!(variant_replacement("JS", "JavaScript"), "JavaScript");
        assert_eq!(variant_replacement("ML", "machine learning"), "Machine learning");
        assert_eq!(variant_replacement("ml", "machine learning"), "machine learning");
    }
}
