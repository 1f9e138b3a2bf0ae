//! The single scoring seam shared by all four dimensions.

use std::collections::BTreeMap;

use crate::models::{ComponentScore, Dimension, Issue, NormalizedDocument};

/// What one scorer reports for one document.
#[derive(Debug, Clone)]
pub struct ScorerOutput {
    pub score: ComponentScore,
    pub issues: Vec<Issue>,
    pub metrics: BTreeMap<String, f64>,
}

impl ScorerOutput {
    pub fn new(score: ComponentScore, issues: Vec<Issue>) -> Self {
        Self {
            score,
            issues,
            metrics: BTreeMap::new(),
        }
    }

    pub fn metric(mut self, name: &str, value: f64) -> Self {
        self.metrics.insert(name.to_string(), value);
        self
    }
}

/// Implement this to add a quality dimension. Scorers are pure: the same
/// document always yields the same output, and the document is never mutated.
///
/// The pipeline iterates them as `Vec<Box<dyn Scorer>>`; read-only resources
/// (lexicons, keyword sets, collaborator output) are handed in at construction.
pub trait Scorer {
    fn dimension(&self) -> Dimension;

    fn score(&self, doc: &NormalizedDocument) -> ScorerOutput;
}
