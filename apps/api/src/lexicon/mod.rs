//! Read-only vocabularies shared by the scorers and the rewriter.
//!
//! Built once at startup and handed to each scorer explicitly, so tests can
//! swap in a small lexicon without touching process state.

use std::collections::HashSet;

pub mod keywords;

pub use keywords::{KeywordBank, KeywordCatalog, KeywordEntry};

/// A low-impact phrase and the stronger wording to use instead.
/// An empty candidate list marks filler that is flagged but never rewritten.
#[derive(Debug, Clone)]
pub struct WeakPhrase {
    pub tokens: Vec<String>,
    pub candidates: Vec<String>,
}

/// `was/were <phrase>` → `<active>`, e.g. "was involved in" → "contributed to".
#[derive(Debug, Clone)]
pub struct PassiveTemplate {
    pub tokens: Vec<String>,
    pub active: String,
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    /// Sorted longest-first so the first hit at a position is the longest match.
    weak_phrases: Vec<WeakPhrase>,
    passive_templates: Vec<PassiveTemplate>,
    action_verbs: HashSet<String>,
}

const WEAK_PHRASES: &[(&str, &[&str])] = &[
    ("responsible for", &["managed", "led", "accountable for"]),
    ("helped with", &["contributed to"]),
    ("helped", &["facilitated"]),
    ("worked on", &["developed", "engineered"]),
    ("worked with", &["collaborated with"]),
    ("assisted with", &["supported"]),
    ("assisted in", &["contributed to"]),
    ("assisted", &["supported"]),
    ("handled", &["managed"]),
    ("in charge of", &["directed"]),
    ("dealt with", &["resolved"]),
    ("took care of", &["oversaw"]),
    ("team player", &["collaborative leader"]),
    ("hard working", &["results-driven"]),
    ("hard-working", &["results-driven"]),
    ("go getter", &["self-starter"]),
    ("a lot of", &["extensive"]),
    ("good", &["strong"]),
    ("great", &["outstanding"]),
    ("nice", &["effective"]),
    ("amazing", &["exceptional"]),
    ("various", &["diverse"]),
    ("many", &["numerous"]),
    ("several", &["multiple"]),
    ("things", &["initiatives"]),
    ("stuff", &["materials"]),
    ("kind of", &[]),
    ("sort of", &[]),
    ("very", &[]),
    ("really", &[]),
    ("etc", &[]),
];

const PASSIVE_TEMPLATES: &[(&str, &str)] = &[
    ("involved in", "contributed to"),
    ("part of", "contributed to"),
    ("tasked with", "delivered"),
    ("in charge of", "directed"),
    ("charged with", "led"),
    ("assigned to", "owned"),
];

const ACTION_VERBS: &[&str] = &[
    "achieved", "adapted", "authored", "built", "coordinated", "created", "decreased",
    "delivered", "designed", "developed", "directed", "engineered", "enhanced", "established",
    "expanded", "generated", "implemented", "improved", "increased", "innovated", "integrated",
    "launched", "led", "managed", "mentored", "motivated", "negotiated", "optimized",
    "orchestrated", "organized", "oversaw", "presented", "reduced", "resolved", "restructured",
    "revitalized", "secured", "spearheaded", "streamlined", "trained", "transformed",
];

fn phrase_tokens(phrase: &str) -> Vec<String> {
    phrase.split_whitespace().map(str::to_lowercase).collect()
}

impl Lexicon {
    pub fn new(
        weak_phrases: &[(&str, &[&str])],
        passive_templates: &[(&str, &str)],
        action_verbs: &[&str],
    ) -> Self {
        let mut weak: Vec<WeakPhrase> = weak_phrases
            .iter()
            .map(|(phrase, candidates)| WeakPhrase {
                tokens: phrase_tokens(phrase),
                candidates: candidates.iter().map(|c| c.to_string()).collect(),
            })
            .filter(|w| !w.tokens.is_empty())
            .collect();
        // Stable: equal lengths keep table order.
        weak.sort_by(|a, b| b.tokens.len().cmp(&a.tokens.len()));

        let mut passive: Vec<PassiveTemplate> = passive_templates
            .iter()
            .map(|(phrase, active)| PassiveTemplate {
                tokens: phrase_tokens(phrase),
                active: active.to_string(),
            })
            .filter(|p| !p.tokens.is_empty())
            .collect();
        passive.sort_by(|a, b| b.tokens.len().cmp(&a.tokens.len()));

        Self {
            weak_phrases: weak,
            passive_templates: passive,
            action_verbs: action_verbs.iter().map(|v| v.to_lowercase()).collect(),
        }
    }

    /// The built-in English resume lexicon.
    pub fn english() -> Self {
        Self::new(WEAK_PHRASES, PASSIVE_TEMPLATES, ACTION_VERBS)
    }

    /// Longest weak phrase starting at `words[at]`.
    pub fn weak_phrase_at(&self, words: &[&str], at: usize) -> Option<&WeakPhrase> {
        self.weak_phrases
            .iter()
            .find(|w| starts_with_tokens(words, at, &w.tokens))
    }

    /// Longest passive template starting at `words[at]` (the word after the auxiliary).
    pub fn passive_template_at(&self, words: &[&str], at: usize) -> Option<&PassiveTemplate> {
        self.passive_templates
            .iter()
            .find(|p| starts_with_tokens(words, at, &p.tokens))
    }

    pub fn is_action_verb(&self, word: &str) -> bool {
        self.action_verbs.contains(word)
    }

    /// Every word the lexicon may write into a document.
    pub fn replacement_vocabulary(&self) -> impl Iterator<Item = &str> {
        self.weak_phrases
            .iter()
            .flat_map(|w| w.candidates.iter().map(String::as_str))
            .chain(self.passive_templates.iter().map(|p| p.active.as_str()))
    }
}

fn starts_with_tokens(words: &[&str], at: usize, tokens: &[String]) -> bool {
    at + tokens.len() <= words.len()
        && tokens
            .iter()
            .zip(&words[at..])
            .all(|(expected, actual)| expected == actual)
}

/// Gives `replacement` the casing pattern of `original`:
/// ALL CAPS stays all caps, a leading capital stays a leading capital.
pub fn match_case(original: &str, replacement: &str) -> String {
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return replacement.to_uppercase();
    }
    match original.chars().next() {
        Some(first) if first.is_uppercase() => {
            let mut chars = replacement.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        _ => replacement.to_string(),
    }
}
