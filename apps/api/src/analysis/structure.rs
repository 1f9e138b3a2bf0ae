//! Structure subscore: section checklist and order, bullet density,
//! document length, sentence length.

use std::collections::BTreeSet;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::scorer::{Scorer, ScorerOutput};
use crate::models::{
    ComponentScore, Dimension, Issue, IssueCategory, Location, NormalizedDocument, SectionLabel,
    Severity,
};

/// Point table for the structure subscore. Defaults sum to 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructurePoints {
    pub contact: f64,
    pub summary: f64,
    pub experience: f64,
    pub education: f64,
    pub skills: f64,
    pub bullet_density: f64,
    pub length: f64,
    pub sentence_length: f64,
    /// Earned when experience comes before education.
    pub section_order: f64,
    /// Bulleted-line ratio in experience/education that earns full points.
    pub bullet_target: f64,
    pub min_sentences: usize,
    pub max_sentences: usize,
    /// Sentences with more words than this are flagged as hard to scan.
    pub max_sentence_words: usize,
}

impl Default for StructurePoints {
    fn default() -> Self {
        Self {
            contact: 15.0,
            summary: 8.0,
            experience: 25.0,
            education: 15.0,
            skills: 12.0,
            bullet_density: 10.0,
            length: 5.0,
            sentence_length: 5.0,
            section_order: 5.0,
            bullet_target: 0.4,
            min_sentences: 15,
            max_sentences: 80,
            max_sentence_words: 20,
        }
    }
}

impl StructurePoints {
    pub fn validate(&self) -> Result<()> {
        let points = [
            self.contact,
            self.summary,
            self.experience,
            self.education,
            self.skills,
            self.bullet_density,
            self.length,
            self.sentence_length,
            self.section_order,
        ];
        if points.iter().any(|p| !p.is_finite() || *p < 0.0) {
            bail!("structure points must be finite and non-negative");
        }
        if !(self.bullet_target > 0.0 && self.bullet_target <= 1.0) {
            bail!("bullet_target must be in (0, 1]");
        }
        if self.min_sentences == 0 || self.min_sentences >= self.max_sentences {
            bail!("sentence band must satisfy 0 < min_sentences < max_sentences");
        }
        if self.max_sentence_words == 0 {
            bail!("max_sentence_words must be at least 1");
        }
        Ok(())
    }

    fn for_section(&self, label: SectionLabel) -> f64 {
        match label {
            SectionLabel::Contact => self.contact,
            SectionLabel::Summary => self.summary,
            SectionLabel::Experience => self.experience,
            SectionLabel::Education => self.education,
            SectionLabel::Skills => self.skills,
            SectionLabel::Other => 0.0,
        }
    }
}

fn missing_severity(label: SectionLabel) -> Severity {
    match label {
        SectionLabel::Contact | SectionLabel::Experience => Severity::High,
        SectionLabel::Education | SectionLabel::Skills => Severity::Medium,
        SectionLabel::Summary | SectionLabel::Other => Severity::Low,
    }
}

fn section_title(label: SectionLabel) -> &'static str {
    match label {
        SectionLabel::Contact => "CONTACT",
        SectionLabel::Summary => "SUMMARY",
        SectionLabel::Experience => "EXPERIENCE",
        SectionLabel::Education => "EDUCATION",
        SectionLabel::Skills => "SKILLS",
        SectionLabel::Other => "OTHER",
    }
}

pub struct StructureScorer<'a> {
    points: &'a StructurePoints,
}

impl<'a> StructureScorer<'a> {
    pub fn new(points: &'a StructurePoints) -> Self {
        Self { points }
    }

    /// Ratio of bulleted lines among the body lines of experience/education.
    /// `None` when those sections have no body.
    fn bullet_ratio(&self, doc: &NormalizedDocument) -> Option<f64> {
        let mut lines = BTreeSet::new();
        let mut bulleted = BTreeSet::new();
        for section in doc.sections.iter().filter(|s| {
            matches!(s.label, SectionLabel::Experience | SectionLabel::Education)
        }) {
            let body_start = section.start_sentence + usize::from(section.heading.is_some());
            for sentence in &doc.sentences[body_start..section.end_sentence] {
                lines.insert(sentence.line);
                if sentence.bullet {
                    bulleted.insert(sentence.line);
                }
            }
        }
        if lines.is_empty() {
            None
        } else {
            Some(bulleted.len() as f64 / lines.len() as f64)
        }
    }

    fn length_factor(&self, sentence_count: usize) -> f64 {
        let p = self.points;
        if sentence_count < p.min_sentences {
            sentence_count as f64 / p.min_sentences as f64
        } else if sentence_count > p.max_sentences {
            let over = (sentence_count - p.max_sentences) as f64;
            (1.0 - over / p.max_sentences as f64).max(0.0)
        } else {
            1.0
        }
    }

    /// `Some(true)` when experience opens before education, `Some(false)`
    /// when education comes first, `None` unless both are present.
    fn experience_first(&self, doc: &NormalizedDocument) -> Option<bool> {
        let first = |label: SectionLabel| {
            doc.sections
                .iter()
                .find(|s| s.label == label)
                .map(|s| s.start_sentence)
        };
        let experience = first(SectionLabel::Experience)?;
        let education = first(SectionLabel::Education)?;
        Some(experience < education)
    }
}

impl Scorer for StructureScorer<'_> {
    fn dimension(&self) -> Dimension {
        Dimension::Structure
    }

    fn score(&self, doc: &NormalizedDocument) -> ScorerOutput {
        let p = self.points;
        let mut value = 0.0;
        let mut issues = Vec::new();
        let mut present = 0;

        for label in SectionLabel::CHECKLIST {
            if doc.has_section(label) {
                value += p.for_section(label);
                present += 1;
            } else {
                issues.push(Issue {
                    category: IssueCategory::Structure,
                    severity: missing_severity(label),
                    location: Location::Section { label },
                    message: format!("No {label} section was detected"),
                    suggestion: Some(format!(
                        "Add a clearly labeled {} section",
                        section_title(label)
                    )),
                });
            }
        }

        let ratio = self.bullet_ratio(doc);
        if let Some(ratio) = ratio {
            value += p.bullet_density * (ratio / p.bullet_target).min(1.0);
            if ratio < p.bullet_target {
                issues.push(Issue {
                    category: IssueCategory::Structure,
                    severity: Severity::Low,
                    location: Location::Document,
                    message: format!(
                        "Only {:.0}% of experience and education lines are bullet points",
                        ratio * 100.0
                    ),
                    suggestion: Some(
                        "Use bullet points to highlight key achievements".to_string(),
                    ),
                });
            }
        } else if doc.has_section(SectionLabel::Experience)
            || doc.has_section(SectionLabel::Education)
        {
            issues.push(Issue {
                category: IssueCategory::Structure,
                severity: Severity::Low,
                location: Location::Document,
                message: "Experience and education headings have no entries beneath them"
                    .to_string(),
                suggestion: Some(
                    "List roles and degrees as bullet points under each heading".to_string(),
                ),
            });
        }

        match self.experience_first(doc) {
            Some(true) => value += p.section_order,
            Some(false) => issues.push(Issue {
                category: IssueCategory::Structure,
                severity: Severity::Low,
                location: Location::Section {
                    label: SectionLabel::Education,
                },
                message: "Education is listed before experience".to_string(),
                suggestion: Some(
                    "Lead with EXPERIENCE unless you are a recent graduate".to_string(),
                ),
            }),
            // Only experience present counts as ordered; a missing
            // experience section is already reported above.
            None if doc.has_section(SectionLabel::Experience) => value += p.section_order,
            None => {}
        }

        let sentence_count = doc.sentences.len();
        let length_factor = self.length_factor(sentence_count);
        value += p.length * length_factor;
        if sentence_count < p.min_sentences {
            issues.push(Issue {
                category: IssueCategory::Structure,
                severity: Severity::Low,
                location: Location::Document,
                message: format!(
                    "The resume is short ({sentence_count} sentences); it may look incomplete"
                ),
                suggestion: Some(
                    "Expand key accomplishments with specific details and impact".to_string(),
                ),
            });
        } else if sentence_count > p.max_sentences {
            issues.push(Issue {
                category: IssueCategory::Structure,
                severity: Severity::Low,
                location: Location::Document,
                message: format!(
                    "The resume is long ({sentence_count} sentences); it may read as unfocused"
                ),
                suggestion: Some("Trim older or less relevant entries".to_string()),
            });
        }

        let mut long_sentences = 0;
        let mut total_words = 0;
        for sentence in &doc.sentences {
            let words = sentence.word_count();
            total_words += words;
            if words > p.max_sentence_words {
                long_sentences += 1;
                issues.push(Issue {
                    category: IssueCategory::Structure,
                    severity: Severity::Low,
                    location: Location::Span {
                        range: sentence.range,
                    },
                    message: format!("This sentence runs to {words} words"),
                    suggestion: Some(format!(
                        "Split it into lines of {} words or fewer",
                        p.max_sentence_words
                    )),
                });
            }
        }
        let sentence_length_factor = if sentence_count == 0 {
            1.0
        } else {
            1.0 - long_sentences as f64 / sentence_count as f64
        };
        value += p.sentence_length * sentence_length_factor;
        let avg_sentence_words = if sentence_count == 0 {
            0.0
        } else {
            total_words as f64 / sentence_count as f64
        };

        let headings = doc.sections.iter().filter(|s| s.heading.is_some()).count();
        ScorerOutput::new(ComponentScore::new(Dimension::Structure, value), issues)
            .metric("sections_present", present as f64)
            .metric("headings", headings as f64)
            .metric("bullet_ratio", ratio.unwrap_or(0.0))
            .metric("sentences", sentence_count as f64)
            .metric("length_factor", length_factor)
            .metric("long_sentences", long_sentences as f64)
            .metric("avg_sentence_words", avg_sentence_words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalizer::normalize;
    use crate::analysis::sections::detect_sections;

    fn make_doc(raw: &str) -> NormalizedDocument {
        let sentences = normalize(raw).unwrap();
        let sections = detect_sections(&sentences);
        NormalizedDocument {
            raw_text: raw.to_string(),
            sentences,
            sections,
        }
    }

    fn full_resume(body_lines: usize) -> String {
        let mut raw = String::from(
            "jane@example.com\nSUMMARY\nBackend engineer\nEXPERIENCE\n",
        );
        for i in 0..body_lines {
            raw.push_str(&format!("• Shipped feature {i}\n"));
        }
        raw.push_str("EDUCATION\n• BSc Computer Science\nSKILLS\nRust, SQL");
        raw
    }

    #[test]
    fn test_complete_resume_scores_full_points() {
        let doc = make_doc(&full_resume(10));
        let points = StructurePoints::default();
        let out = StructureScorer::new(&points).score(&doc);
        assert!(out.issues.is_empty(), "{:?}", out.issues);
        assert_eq!(out.score.value, 100.0);
        assert_eq!(out.metrics["bullet_ratio"], 1.0);
    }

    #[test]
    fn test_zero_headings_scores_at_most_length_terms() {
        let doc = make_doc("I write code.\nI review code.\nI ship code.");
        let points = StructurePoints::default();
        let out = StructureScorer::new(&points).score(&doc);
        let missing: Vec<_> = out
            .issues
            .iter()
            .filter(|i| matches!(i.location, Location::Section { .. }))
            .collect();
        assert_eq!(missing.len(), 5);
        assert!(out.score.value <= points.length + points.sentence_length);
        assert!(out.score.value >= 0.0);
        let expected = points.length * 3.0 / 15.0 + points.sentence_length;
        assert!((out.score.value - expected).abs() < 1e-9);
    }

    #[test]
    fn test_missing_experience_is_high_severity() {
        let doc = make_doc("jane@example.com\nEDUCATION\nBSc");
        let points = StructurePoints::default();
        let out = StructureScorer::new(&points).score(&doc);
        let experience = out
            .issues
            .iter()
            .find(|i| {
                i.location
                    == Location::Section {
                        label: SectionLabel::Experience,
                    }
            })
            .unwrap();
        assert_eq!(experience.severity, Severity::High);
    }

    #[test]
    fn test_sparse_bullets_lose_density_points() {
        let raw = "jane@example.com\nSUMMARY\nEngineer\nEXPERIENCE\nAcme\nBuilt things\n\
                   Shipped things\n• One bullet\nEDUCATION\nBSc\nSKILLS\nRust";
        let doc = make_doc(raw);
        let points = StructurePoints::default();
        let out = StructureScorer::new(&points).score(&doc);
        // 1 bulleted line of 5 body lines: ratio 0.2, half of the target
        assert!((out.metrics["bullet_ratio"] - 0.2).abs() < 1e-9);
        assert!(out
            .issues
            .iter()
            .any(|i| i.message.contains("bullet points")));
    }

    #[test]
    fn test_uppercase_entry_lines_count_toward_bullet_density() {
        let raw = "jane@example.com\nSUMMARY\nEngineer\nEXPERIENCE\nSENIOR ENGINEER\n\
                   • Shipped A\n• Shipped B\n• Shipped C\nEDUCATION\nMIT\n• BSc Physics\n\
                   SKILLS\nRust";
        let doc = make_doc(raw);
        let points = StructurePoints::default();
        let out = StructureScorer::new(&points).score(&doc);
        // 4 bulleted lines of 6 body lines
        assert!((out.metrics["bullet_ratio"] - 4.0 / 6.0).abs() < 1e-9);
        assert!(!out
            .issues
            .iter()
            .any(|i| i.message.contains("bullet points")));
    }

    #[test]
    fn test_empty_experience_and_education_are_reported() {
        let doc = make_doc("jane@example.com\nEXPERIENCE\nEDUCATION\nSKILLS\nRust");
        let points = StructurePoints::default();
        let out = StructureScorer::new(&points).score(&doc);
        assert_eq!(out.metrics["bullet_ratio"], 0.0);
        let empty = out
            .issues
            .iter()
            .find(|i| i.message.contains("no entries"))
            .unwrap();
        assert_eq!(empty.severity, Severity::Low);
        assert_eq!(empty.location, Location::Document);
    }

    #[test]
    fn test_education_before_experience_loses_order_points() {
        let ordered = make_doc(&full_resume(10));
        let swapped = make_doc(
            "jane@example.com\nSUMMARY\nBackend engineer\nEDUCATION\n• BSc Computer Science\n\
             EXPERIENCE\n• Shipped A\n• Shipped B\nSKILLS\nRust, SQL",
        );
        let points = StructurePoints::default();
        let scorer = StructureScorer::new(&points);
        let swapped_out = scorer.score(&swapped);
        let order = swapped_out
            .issues
            .iter()
            .find(|i| i.message.contains("before experience"))
            .unwrap();
        assert_eq!(
            order.location,
            Location::Section {
                label: SectionLabel::Education
            }
        );
        assert!(scorer
            .score(&ordered)
            .issues
            .iter()
            .all(|i| !i.message.contains("before experience")));
    }

    #[test]
    fn test_long_sentences_are_flagged_by_span() {
        let long = "Led a cross functional group of engineers designers and analysts \
                    through a long migration of every billing service to a new platform";
        let raw = format!("{}\n• {long}\n• Short line", full_resume(10));
        let doc = make_doc(&raw);
        let points = StructurePoints::default();
        let out = StructureScorer::new(&points).score(&doc);
        assert_eq!(out.metrics["long_sentences"], 1.0);
        let flagged: Vec<_> = out
            .issues
            .iter()
            .filter(|i| i.message.contains("words"))
            .collect();
        assert_eq!(flagged.len(), 1);
        let Location::Span { range } = flagged[0].location else {
            panic!("expected a span location");
        };
        assert_eq!(range.slice(&raw), long);
        // One long sentence of 20 costs a twentieth of the sentence-length term
        let lost = points.sentence_length / 20.0;
        assert!((out.score.value - (100.0 - lost)).abs() < 1e-9);
    }

    #[test]
    fn test_length_band_decays_on_both_sides() {
        let points = StructurePoints::default();
        let scorer = StructureScorer::new(&points);
        assert_eq!(scorer.length_factor(15), 1.0);
        assert_eq!(scorer.length_factor(80), 1.0);
        assert!(scorer.length_factor(5) < 1.0);
        assert!(scorer.length_factor(120) < 1.0);
        assert_eq!(scorer.length_factor(400), 0.0);
    }

    #[test]
    fn test_default_points_validate() {
        assert!(StructurePoints::default().validate().is_ok());
        let bad = StructurePoints {
            min_sentences: 90,
            ..StructurePoints::default()
        };
        assert!(bad.validate().is_err());
        let no_words = StructurePoints {
            max_sentence_words: 0,
            ..StructurePoints::default()
        };
        assert!(no_words.validate().is_err());
    }
}
