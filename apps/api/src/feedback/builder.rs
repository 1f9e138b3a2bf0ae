//! Turns scores and issues into the four fixed feedback sections.

use std::collections::HashSet;

use crate::config::AnalysisConfig;
use crate::feedback::{
    FeedbackReport, FeedbackSection, OverallRecommendation, SeverityThresholds, Tier,
};
use crate::models::{AnalysisResult, Dimension, Issue, Location, NormalizedDocument};

const GENERAL_ADVICE: &[&str] = &[
    "Focus on quantifiable achievements rather than just listing responsibilities.",
    "Tailor your resume for each specific job application.",
    "Keep resume length appropriate (1 page for entry-level, 2 pages for experienced professionals).",
    "Ensure consistent formatting throughout the document.",
];

pub struct FeedbackBuilder<'a> {
    thresholds: &'a SeverityThresholds,
    max_details: usize,
}

impl<'a> FeedbackBuilder<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self {
            thresholds: &config.severity_thresholds,
            max_details: config.max_details_per_section,
        }
    }

    /// Deterministic: the same result and document always give the same report.
    pub fn build(&self, result: &AnalysisResult, doc: &NormalizedDocument) -> FeedbackReport {
        let sections = Dimension::ALL
            .into_iter()
            .map(|dimension| self.section(dimension, result, doc))
            .collect();
        FeedbackReport {
            sections,
            overall: self.overall(result),
        }
    }

    fn section(
        &self,
        dimension: Dimension,
        result: &AnalysisResult,
        doc: &NormalizedDocument,
    ) -> FeedbackSection {
        let score = result.component_scores.get(dimension);
        let tier = self.thresholds.tier(score.value);
        let summary = if score.available {
            summary_for(dimension, tier).to_string()
        } else {
            "Grammar and spelling could not be checked right now; this score is a neutral estimate."
                .to_string()
        };

        // all_issues is already in document order
        let issues: Vec<&Issue> = result.issues_for(dimension).collect();

        let mut details: Vec<String> = issues
            .iter()
            .take(self.max_details)
            .map(|issue| render_detail(issue, doc))
            .collect();
        if issues.len() > self.max_details {
            details.push(format!("+{} more", issues.len() - self.max_details));
        }
        if issues.is_empty() && score.available {
            details.push("No issues found.".to_string());
        }

        let mut seen = HashSet::new();
        let suggestions = issues
            .iter()
            .filter_map(|issue| render_suggestion(issue, doc))
            .filter(|s| seen.insert(s.to_lowercase()))
            .collect();

        FeedbackSection {
            dimension,
            title: dimension.title().to_string(),
            tier,
            summary,
            details,
            suggestions,
        }
    }

    fn overall(&self, result: &AnalysisResult) -> OverallRecommendation {
        let score = result.overall_score;
        let mut details = vec![match self.thresholds.tier(score) {
            Tier::Excellent => "Excellent resume! Only minor improvements needed.",
            Tier::Good => "Good resume with some areas for improvement.",
            Tier::Adequate => "Average resume that needs several significant improvements.",
            Tier::Critical => "Resume needs major revisions to be competitive.",
        }
        .to_string()];

        let priority: Vec<&str> = result
            .component_scores
            .iter()
            .filter(|s| s.available && s.value < self.thresholds.adequate)
            .map(|s| s.dimension.title())
            .collect();
        if !priority.is_empty() {
            details.push(format!(
                "Priority improvement areas: {}",
                priority.join(", ")
            ));
        }

        OverallRecommendation {
            title: "Overall Recommendations".to_string(),
            summary: format!("Your resume scored {score:.1}/100"),
            details,
            suggestions: GENERAL_ADVICE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn summary_for(dimension: Dimension, tier: Tier) -> &'static str {
    match (dimension, tier) {
        (Dimension::Grammar, Tier::Excellent) => "Excellent! Grammar and spelling are clean.",
        (Dimension::Grammar, Tier::Good) => "A few grammar or spelling issues could be improved.",
        (Dimension::Grammar, Tier::Adequate) => {
            "Several grammar and spelling issues need attention."
        }
        (Dimension::Grammar, Tier::Critical) => {
            "Grammar and spelling need significant work before this resume is sent."
        }
        (Dimension::Structure, Tier::Excellent) => {
            "Strong structural foundation with clear organization."
        }
        (Dimension::Structure, Tier::Good) => {
            "Solid document structure with opportunities for enhanced clarity."
        }
        (Dimension::Structure, Tier::Adequate) => {
            "The structure is usable but missing elements recruiters look for."
        }
        (Dimension::Structure, Tier::Critical) => {
            "The document needs significant structural work."
        }
        (Dimension::LanguageStrength, Tier::Excellent) => {
            "Outstanding use of strong, professional language."
        }
        (Dimension::LanguageStrength, Tier::Good) => {
            "Strong language foundation with fine-tuning opportunities."
        }
        (Dimension::LanguageStrength, Tier::Adequate) => {
            "Good foundation with clear opportunities for language strengthening."
        }
        (Dimension::LanguageStrength, Tier::Critical) => {
            "Language needs significant strengthening for professional impact."
        }
        (Dimension::Keywords, Tier::Excellent) => {
            "Excellent keyword coverage for the selected keyword sets."
        }
        (Dimension::Keywords, Tier::Good) => "Good use of industry keywords.",
        (Dimension::Keywords, Tier::Adequate) => {
            "Adequate keyword usage; some important terms are missing."
        }
        (Dimension::Keywords, Tier::Critical) => {
            "Limited keyword usage; many important terms are missing."
        }
    }
}

fn render_detail(issue: &Issue, doc: &NormalizedDocument) -> String {
    match &issue.location {
        Location::Span { range } => {
            format!("Line {}: {}", doc.line_number(range.start), issue.message)
        }
        Location::Section { label } => {
            format!("{} section: {}", capitalize(label.as_str()), issue.message)
        }
        Location::Document => issue.message.clone(),
    }
}

/// Span suggestions read as a replacement; located-elsewhere ones are advice.
fn render_suggestion(issue: &Issue, doc: &NormalizedDocument) -> Option<String> {
    let suggestion = issue.suggestion.as_deref().filter(|s| !s.is_empty())?;
    Some(match &issue.location {
        Location::Span { range } => {
            let original = doc.raw_text.get(range.start..range.end).unwrap_or_default();
            format!("Replace \"{original}\" with \"{suggestion}\"")
        }
        Location::Section { .. } | Location::Document => suggestion.to_string(),
    })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
