//! Section detection over normalized sentences.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Section, SectionLabel, Sentence};

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email regex is valid")
});

static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\(?\d[\d\s().-]{7,}\d").expect("phone regex is valid"));

const HEADING_VOCABULARY: &[(SectionLabel, &[&str])] = &[
    (
        SectionLabel::Experience,
        &[
            "experience",
            "work experience",
            "professional experience",
            "employment",
            "employment history",
            "work history",
        ],
    ),
    (SectionLabel::Education, &["education", "academic background"]),
    (
        SectionLabel::Skills,
        &["skills", "technical skills", "core competencies", "competencies"],
    ),
    (
        SectionLabel::Summary,
        &[
            "summary",
            "professional summary",
            "objective",
            "career objective",
            "profile",
        ],
    ),
    (
        SectionLabel::Contact,
        &["contact", "contact information", "contact details"],
    ),
];

/// Section titles that are not scored but still close the section above them.
const OTHER_HEADINGS: &[&str] = &[
    "projects",
    "certifications",
    "certificates",
    "awards",
    "honors",
    "publications",
    "volunteer",
    "volunteering",
    "languages",
    "interests",
    "activities",
    "references",
];

const MAX_HEADING_TOKENS: usize = 4;
const TITLE_CASE_EXEMPT: &[&str] = &["and", "of", "the", "&", "for", "in"];

/// Splits the sentence list into contiguous labeled sections covering every
/// sentence. A heading sentence belongs to the section it opens.
pub fn detect_sections(sentences: &[Sentence]) -> Vec<Section> {
    let mut headings: Vec<(usize, SectionLabel)> = Vec::new();
    for (idx, sentence) in sentences.iter().enumerate() {
        let Some(label) = heading_label(sentence) else {
            continue;
        };
        // Unscored titles only close an open section; before the first
        // scored heading they stay in the preamble.
        if label == SectionLabel::Other && headings.is_empty() {
            continue;
        }
        headings.push((idx, label));
    }

    if headings.is_empty() {
        return vec![Section {
            label: SectionLabel::Other,
            start_sentence: 0,
            end_sentence: sentences.len(),
            heading: None,
        }];
    }

    let mut sections = Vec::with_capacity(headings.len() + 1);
    let first = headings[0].0;
    if first > 0 {
        let preamble = &sentences[..first];
        let label = if preamble.iter().any(|s| has_contact_details(&s.text)) {
            SectionLabel::Contact
        } else {
            SectionLabel::Other
        };
        sections.push(Section {
            label,
            start_sentence: 0,
            end_sentence: first,
            heading: None,
        });
    }

    for (k, &(start, label)) in headings.iter().enumerate() {
        let end = headings
            .get(k + 1)
            .map(|&(next, _)| next)
            .unwrap_or(sentences.len());
        sections.push(Section {
            label,
            start_sentence: start,
            end_sentence: end,
            heading: Some(sentences[start].range),
        });
    }

    tracing::debug!(
        "Detected {} sections ({} headings)",
        sections.len(),
        headings.len()
    );
    sections
}

/// `Some(label)` when the sentence reads as a section heading. Unscored
/// section titles such as PROJECTS get `Other`; any other short line (a job
/// title, a school name) is body text whatever its casing.
pub fn heading_label(sentence: &Sentence) -> Option<SectionLabel> {
    if !sentence.standalone
        || sentence.bullet
        || sentence.tokens.is_empty()
        || sentence.tokens.len() > MAX_HEADING_TOKENS
    {
        return None;
    }
    let shaped = is_all_caps(sentence)
        || is_title_case(sentence)
        || sentence.text.trim_end().ends_with(':');
    if !shaped {
        return None;
    }
    let words: Vec<&str> = sentence.tokens.iter().map(|t| t.normalized.as_str()).collect();
    vocabulary_label(&words).or_else(|| {
        words
            .iter()
            .any(|w| OTHER_HEADINGS.contains(w))
            .then_some(SectionLabel::Other)
    })
}

/// Longest vocabulary keyword contained in `words` as a token run.
fn vocabulary_label(words: &[&str]) -> Option<SectionLabel> {
    let mut best: Option<(usize, SectionLabel)> = None;
    for (label, keywords) in HEADING_VOCABULARY {
        for keyword in *keywords {
            let parts: Vec<&str> = keyword.split(' ').collect();
            let found = words.windows(parts.len()).any(|w| w == parts.as_slice());
            if found && best.map_or(true, |(len, _)| keyword.len() > len) {
                best = Some((keyword.len(), *label));
            }
        }
    }
    best.map(|(_, label)| label)
}

fn is_all_caps(sentence: &Sentence) -> bool {
    let mut letters = sentence
        .tokens
        .iter()
        .flat_map(|t| t.surface.chars())
        .filter(|c| c.is_alphabetic())
        .peekable();
    letters.peek().is_some() && letters.all(char::is_uppercase)
}

fn is_title_case(sentence: &Sentence) -> bool {
    sentence.tokens.iter().all(|t| {
        TITLE_CASE_EXEMPT.contains(&t.normalized.as_str())
            || !t.surface.starts_with(char::is_alphabetic)
            || t.surface.starts_with(char::is_uppercase)
    })
}

pub fn has_contact_details(text: &str) -> bool {
    EMAIL.is_match(text) || PHONE.is_match(text)
}
