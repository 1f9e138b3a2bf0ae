//! Language-strength subscore: weak phrases and passive constructions.

use std::ops::Range;

use crate::analysis::scorer::{Scorer, ScorerOutput};
use crate::lexicon::{match_case, Lexicon};
use crate::models::{
    ComponentScore, Dimension, Issue, IssueCategory, NormalizedDocument, PosTag, Sentence,
    Severity, TextRange,
};

/// Past-tense auxiliaries that open a passive construction.
const PASSIVE_AUXILIARIES: &[&str] = &["was", "were"];

pub struct LanguageStrengthScorer<'a> {
    lexicon: &'a Lexicon,
    density_scale: f64,
}

#[derive(Debug, Default)]
struct SentenceFindings {
    issues: Vec<Issue>,
    weak: usize,
    passive: usize,
    action_verbs: usize,
}

impl<'a> LanguageStrengthScorer<'a> {
    pub fn new(lexicon: &'a Lexicon, density_scale: f64) -> Self {
        Self {
            lexicon,
            density_scale,
        }
    }

    fn scan(&self, raw: &str, sentence: &Sentence, findings: &mut SentenceFindings) {
        let tokens = &sentence.tokens;
        let words: Vec<&str> = tokens.iter().map(|t| t.normalized.as_str()).collect();
        let span = |r: Range<usize>| {
            TextRange::new(tokens[r.start].range.start, tokens[r.end - 1].range.end)
        };

        // Token-index ranges already claimed by a passive match.
        let mut claimed: Vec<Range<usize>> = Vec::new();

        for (i, word) in words.iter().enumerate() {
            if tokens[i].pos != Some(PosTag::Auxiliary) || !PASSIVE_AUXILIARIES.contains(word) {
                continue;
            }
            // Only at sentence start or right after a first-person pronoun.
            if i > 0 && tokens[i - 1].pos != Some(PosTag::Pronoun) {
                continue;
            }
            if let Some(template) = self.lexicon.passive_template_at(&words, i + 1) {
                let r = i..i + 1 + template.tokens.len();
                let range = span(r.clone());
                let original = range.slice(raw);
                findings.issues.push(Issue::at_span(
                    IssueCategory::WeakPhrase,
                    Severity::High,
                    range,
                    format!(
                        "Passive construction \"{original}\"; lead with what you did"
                    ),
                    Some(match_case(original, &template.active)),
                ));
                claimed.push(r);
                findings.passive += 1;
            } else if words.get(i + 2) == Some(&"by")
                && words
                    .get(i + 1)
                    .is_some_and(|w| self.lexicon.is_action_verb(w))
            {
                let r = i..i + 3;
                let range = span(r.clone());
                findings.issues.push(Issue::at_span(
                    IssueCategory::WeakPhrase,
                    Severity::High,
                    range,
                    format!(
                        "Passive voice \"{}\"; start the line with the verb instead",
                        range.slice(raw)
                    ),
                    None,
                ));
                claimed.push(r);
                findings.passive += 1;
            }
        }

        let mut j = 0;
        while j < words.len() {
            if self.lexicon.is_action_verb(words[j]) {
                findings.action_verbs += 1;
            }
            let Some(weak) = self.lexicon.weak_phrase_at(&words, j) else {
                j += 1;
                continue;
            };
            let r = j..j + weak.tokens.len();
            let inside_passive = claimed
                .iter()
                .any(|c| c.start <= r.start && r.end <= c.end);
            if inside_passive {
                j += 1;
                continue;
            }
            let range = span(r.clone());
            let original = range.slice(raw);
            let severity = if weak.tokens.len() > 1 {
                Severity::Medium
            } else {
                Severity::Low
            };
            let (message, suggestion) = match weak.candidates.first() {
                Some(candidate) => (
                    format!("\"{original}\" is weak phrasing; consider \"{candidate}\""),
                    Some(match_case(original, candidate)),
                ),
                None => (format!("\"{original}\" adds little; consider removing it"), None),
            };
            findings.issues.push(Issue::at_span(
                IssueCategory::WeakPhrase,
                severity,
                range,
                message,
                suggestion,
            ));
            findings.weak += 1;
            j = r.end;
        }
    }
}

impl Scorer for LanguageStrengthScorer<'_> {
    fn dimension(&self) -> Dimension {
        Dimension::LanguageStrength
    }

    fn score(&self, doc: &NormalizedDocument) -> ScorerOutput {
        let mut findings = SentenceFindings::default();
        for sentence in &doc.sentences {
            self.scan(&doc.raw_text, sentence, &mut findings);
        }

        let matches = findings.weak + findings.passive;
        let sentences = doc.sentences.len().max(1) as f64;
        let density = matches as f64 / sentences;
        let value = 100.0 - (self.density_scale * density).min(100.0);

        ScorerOutput::new(
            ComponentScore::new(Dimension::LanguageStrength, value),
            findings.issues,
        )
        .metric("weak_phrases", findings.weak as f64)
        .metric("passive_constructions", findings.passive as f64)
        .metric("action_verbs", findings.action_verbs as f64)
        .metric("match_density", density)
    }
}
