use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` into the original extracted text.
///
/// Every stage downstream of normalization carries ranges in this one offset
/// space; nothing re-derives offsets from normalized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// True when the two ranges share at least one byte.
    pub fn intersects(&self, other: &TextRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True when `self` is a valid slice range of `text`.
    pub fn is_valid_in(&self, text: &str) -> bool {
        self.start <= self.end
            && self.end <= text.len()
            && text.is_char_boundary(self.start)
            && text.is_char_boundary(self.end)
    }

    pub fn slice<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start..self.end]
    }
}

/// The smallest formatting-preserving container (paragraph, run or line) of
/// the uploaded file, as reported by the extraction collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralUnit {
    pub unit_id: String,
    pub range: TextRange,
}

/// What the extraction collaborator hands to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub raw_text: String,
    #[serde(default)]
    pub structural_units: Vec<StructuralUnit>,
}

impl ExtractedDocument {
    pub fn from_text(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            structural_units: Vec::new(),
        }
    }
}

/// Coarse part-of-speech tag assigned during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PosTag {
    Number,
    Pronoun,
    Auxiliary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub surface: String,
    /// Lowercased surface form.
    pub normalized: String,
    pub pos: Option<PosTag>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    /// Whitespace-collapsed, control-character-free text.
    pub text: String,
    pub tokens: Vec<Token>,
    /// Span in the original text, from the first to the last non-space char.
    pub range: TextRange,
    /// 0-based line index in the original text.
    pub line: usize,
    /// The line this sentence sits on starts with a bullet marker.
    pub bullet: bool,
    /// The sentence is the only sentence on its line.
    pub standalone: bool,
}

impl Sentence {
    pub fn word_count(&self) -> usize {
        self.tokens.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLabel {
    Contact,
    Summary,
    Experience,
    Education,
    Skills,
    Other,
}

impl SectionLabel {
    /// The sections a complete resume is expected to have, in checklist order.
    pub const CHECKLIST: [SectionLabel; 5] = [
        SectionLabel::Contact,
        SectionLabel::Summary,
        SectionLabel::Experience,
        SectionLabel::Education,
        SectionLabel::Skills,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionLabel::Contact => "contact",
            SectionLabel::Summary => "summary",
            SectionLabel::Experience => "experience",
            SectionLabel::Education => "education",
            SectionLabel::Skills => "skills",
            SectionLabel::Other => "other",
        }
    }
}

impl std::fmt::Display for SectionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labeled run of sentences, `[start_sentence, end_sentence)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub label: SectionLabel,
    pub start_sentence: usize,
    pub end_sentence: usize,
    /// Range of the heading line, when the section was opened by one.
    pub heading: Option<TextRange>,
}

/// Output of normalization plus section detection. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedDocument {
    pub raw_text: String,
    pub sentences: Vec<Sentence>,
    pub sections: Vec<Section>,
}

impl NormalizedDocument {
    pub fn has_section(&self, label: SectionLabel) -> bool {
        self.sections.iter().any(|s| s.label == label)
    }

    /// 1-based line number of a byte offset in the original text.
    pub fn line_number(&self, offset: usize) -> usize {
        let end = offset.min(self.raw_text.len());
        self.raw_text.as_bytes()[..end]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_intersection_is_half_open() {
        let a = TextRange::new(0, 5);
        let b = TextRange::new(5, 9);
        let c = TextRange::new(4, 6);
        assert!(!a.intersects(&b), "touching ranges do not intersect");
        assert!(a.intersects(&c));
        assert!(b.intersects(&c));
    }

    #[test]
    fn test_range_validity_respects_char_boundaries() {
        let text = "café";
        assert!(TextRange::new(0, 3).is_valid_in(text));
        // 'é' is two bytes starting at 3
        assert!(!TextRange::new(0, 4).is_valid_in(text));
        assert!(TextRange::new(3, 5).is_valid_in(text));
        assert!(!TextRange::new(3, 6).is_valid_in(text));
    }

    #[test]
    fn test_section_label_serde_is_snake_case() {
        let json = serde_json::to_string(&SectionLabel::Experience).unwrap();
        assert_eq!(json, r#""experience""#);
    }

    #[test]
    fn test_line_number_counts_newlines() {
        let doc = NormalizedDocument {
            raw_text: "a\nb\nc".to_string(),
            sentences: vec![],
            sections: vec![],
        };
        assert_eq!(doc.line_number(0), 1);
        assert_eq!(doc.line_number(2), 2);
        assert_eq!(doc.line_number(4), 3);
    }
}
