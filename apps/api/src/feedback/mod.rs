//! Human-readable feedback derived from an `AnalysisResult`.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::Dimension;

pub mod builder;

pub use builder::FeedbackBuilder;

/// Score cutoffs for the summary ladder. Strictly descending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityThresholds {
    pub excellent: f64,
    pub good: f64,
    pub adequate: f64,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            excellent: 85.0,
            good: 70.0,
            adequate: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Excellent,
    Good,
    Adequate,
    Critical,
}

impl SeverityThresholds {
    /// Parses `excellent,good,adequate`, e.g. `85,70,50`.
    pub fn parse(raw: &str) -> Result<Self> {
        let values = raw
            .split(',')
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .with_context(|| format!("'{}' is not a number", v.trim()))
            })
            .collect::<Result<Vec<_>>>()?;
        let [excellent, good, adequate] = values[..] else {
            bail!("expected three cutoffs (excellent,good,adequate), got {}", values.len());
        };
        let thresholds = Self {
            excellent,
            good,
            adequate,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !(in_range(self.excellent) && in_range(self.good) && in_range(self.adequate)) {
            bail!("severity thresholds must lie within [0, 100]");
        }
        if !(self.excellent > self.good && self.good > self.adequate) {
            bail!("severity thresholds must be strictly descending");
        }
        Ok(())
    }

    pub fn tier(&self, score: f64) -> Tier {
        if score >= self.excellent {
            Tier::Excellent
        } else if score >= self.good {
            Tier::Good
        } else if score >= self.adequate {
            Tier::Adequate
        } else {
            Tier::Critical
        }
    }
}

/// Feedback for one dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSection {
    pub dimension: Dimension,
    pub title: String,
    pub tier: Tier,
    pub summary: String,
    pub details: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallRecommendation {
    pub title: String,
    pub summary: String,
    pub details: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Exactly one section per dimension in display order, plus the overall
/// recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackReport {
    pub sections: Vec<FeedbackSection>,
    pub overall: OverallRecommendation,
}
