use serde::{Deserialize, Serialize};

use crate::models::document::{SectionLabel, TextRange};
use crate::models::score::Dimension;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCategory {
    Grammar,
    WeakPhrase,
    MissingKeyword,
    Structure,
}

impl IssueCategory {
    /// The score dimension an issue of this category is reported under.
    pub fn dimension(&self) -> Dimension {
        match self {
            IssueCategory::Grammar => Dimension::Grammar,
            IssueCategory::Structure => Dimension::Structure,
            IssueCategory::WeakPhrase => Dimension::LanguageStrength,
            IssueCategory::MissingKeyword => Dimension::Keywords,
        }
    }

    /// Only these categories feed automatic rewriting.
    pub fn is_rewritable(&self) -> bool {
        matches!(self, IssueCategory::WeakPhrase | IssueCategory::MissingKeyword)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    Span { range: TextRange },
    Section { label: SectionLabel },
    Document,
}

/// A located, categorized finding. Produced by scorers; never mutates the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub category: IssueCategory,
    pub severity: Severity,
    pub location: Location,
    pub message: String,
    pub suggestion: Option<String>,
}

impl Issue {
    pub fn at_span(
        category: IssueCategory,
        severity: Severity,
        range: TextRange,
        message: impl Into<String>,
        suggestion: Option<String>,
    ) -> Self {
        Self {
            category,
            severity,
            location: Location::Span { range },
            message: message.into(),
            suggestion,
        }
    }

    pub fn span(&self) -> Option<TextRange> {
        match self.location {
            Location::Span { range } => Some(range),
            _ => None,
        }
    }

    /// Document-order key: span-located issues by start offset, everything
    /// else after them.
    pub fn order_key(&self) -> (usize, usize) {
        match self.location {
            Location::Span { range } => (range.start, range.end),
            Location::Section { .. } | Location::Document => (usize::MAX, usize::MAX),
        }
    }
}

/// Stable sort into document order.
pub fn sort_by_document_order(issues: &mut [Issue]) {
    issues.sort_by_key(|i| i.order_key());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&IssueCategory::WeakPhrase).unwrap(),
            r#""weak-phrase""#
        );
        assert_eq!(
            serde_json::to_string(&IssueCategory::MissingKeyword).unwrap(),
            r#""missing-keyword""#
        );
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_only_language_and_keyword_issues_are_rewritable() {
        assert!(IssueCategory::WeakPhrase.is_rewritable());
        assert!(IssueCategory::MissingKeyword.is_rewritable());
        assert!(!IssueCategory::Grammar.is_rewritable());
        assert!(!IssueCategory::Structure.is_rewritable());
    }

    #[test]
    fn test_document_order_puts_unlocated_issues_last() {
        let mut issues = vec![
            Issue {
                category: IssueCategory::Structure,
                severity: Severity::High,
                location: Location::Section {
                    label: SectionLabel::Contact,
                },
                message: "missing".to_string(),
                suggestion: None,
            },
            Issue::at_span(
                IssueCategory::WeakPhrase,
                Severity::Low,
                TextRange::new(40, 44),
                "later",
                None,
            ),
            Issue::at_span(
                IssueCategory::WeakPhrase,
                Severity::Low,
                TextRange::new(3, 8),
                "earlier",
                None,
            ),
        ];
        sort_by_document_order(&mut issues);
        assert_eq!(issues[0].message, "earlier");
        assert_eq!(issues[1].message, "later");
        assert_eq!(issues[2].message, "missing");
    }

    #[test]
    fn test_location_serializes_with_kind_tag() {
        let loc = Location::Span {
            range: TextRange::new(1, 4),
        };
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["kind"], "span");
        assert_eq!(json["range"]["start"], 1);
    }
}
