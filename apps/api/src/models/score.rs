use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::issue::Issue;

/// The four fixed quality dimensions, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Grammar,
    Structure,
    LanguageStrength,
    Keywords,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Grammar,
        Dimension::Structure,
        Dimension::LanguageStrength,
        Dimension::Keywords,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Grammar => "grammar",
            Dimension::Structure => "structure",
            Dimension::LanguageStrength => "language_strength",
            Dimension::Keywords => "keywords",
        }
    }

    pub fn parse(name: &str) -> Option<Dimension> {
        Dimension::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Human-facing title used for feedback sections.
    pub fn title(&self) -> &'static str {
        match self {
            Dimension::Grammar => "Grammar & Spelling",
            Dimension::Structure => "Clarity & Structure",
            Dimension::LanguageStrength => "Language Strength",
            Dimension::Keywords => "Keyword Optimization",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dimension's subscore in [0, 100].
///
/// `available = false` means the dimension could not be measured (the grammar
/// collaborator did not respond) and `value` is a neutral stand-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub dimension: Dimension,
    pub value: f64,
    pub available: bool,
}

impl ComponentScore {
    pub fn new(dimension: Dimension, value: f64) -> Self {
        Self {
            dimension,
            value: value.clamp(0.0, 100.0),
            available: true,
        }
    }

    pub fn unavailable(dimension: Dimension) -> Self {
        Self {
            dimension,
            value: 0.0,
            available: false,
        }
    }
}

/// One named slot per dimension, so a dimension can never be missing or
/// duplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub grammar: ComponentScore,
    pub structure: ComponentScore,
    pub language_strength: ComponentScore,
    pub keywords: ComponentScore,
}

impl ComponentScores {
    /// Every dimension present and marked unavailable; scorers fill the slots.
    pub fn unmeasured() -> Self {
        Self {
            grammar: ComponentScore::unavailable(Dimension::Grammar),
            structure: ComponentScore::unavailable(Dimension::Structure),
            language_strength: ComponentScore::unavailable(Dimension::LanguageStrength),
            keywords: ComponentScore::unavailable(Dimension::Keywords),
        }
    }

    pub fn get(&self, dimension: Dimension) -> &ComponentScore {
        match dimension {
            Dimension::Grammar => &self.grammar,
            Dimension::Structure => &self.structure,
            Dimension::LanguageStrength => &self.language_strength,
            Dimension::Keywords => &self.keywords,
        }
    }

    pub fn get_mut(&mut self, dimension: Dimension) -> &mut ComponentScore {
        match dimension {
            Dimension::Grammar => &mut self.grammar,
            Dimension::Structure => &mut self.structure,
            Dimension::LanguageStrength => &mut self.language_strength,
            Dimension::Keywords => &mut self.keywords,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentScore> {
        Dimension::ALL.into_iter().map(move |d| self.get(d))
    }
}

/// Result of one analysis request. Created once, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Weighted aggregate in [0, 100], one decimal.
    pub overall_score: f64,
    pub component_scores: ComponentScores,
    /// All issues from all scorers, in document order.
    pub all_issues: Vec<Issue>,
    /// Per-dimension diagnostic numbers (match counts, coverage, ratios).
    pub dimension_metrics: BTreeMap<Dimension, BTreeMap<String, f64>>,
}

impl AnalysisResult {
    pub fn issues_for(&self, dimension: Dimension) -> impl Iterator<Item = &Issue> {
        self.all_issues
            .iter()
            .filter(move |i| i.category.dimension() == dimension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_score_is_clamped() {
        assert_eq!(ComponentScore::new(Dimension::Grammar, 140.0).value, 100.0);
        assert_eq!(ComponentScore::new(Dimension::Grammar, -3.0).value, 0.0);
    }

    #[test]
    fn test_unmeasured_covers_every_dimension() {
        let scores = ComponentScores::unmeasured();
        let dimensions: Vec<_> = scores.iter().map(|s| s.dimension).collect();
        assert_eq!(dimensions, Dimension::ALL.to_vec());
        assert!(scores.iter().all(|s| !s.available));
    }

    #[test]
    fn test_dimension_parse_accepts_snake_case_names() {
        assert_eq!(
            Dimension::parse("language_strength"),
            Some(Dimension::LanguageStrength)
        );
        assert_eq!(Dimension::parse(" Keywords "), Some(Dimension::Keywords));
        assert_eq!(Dimension::parse("tone"), None);
    }
}
