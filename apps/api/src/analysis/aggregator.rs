//! Overall score: a fixed-weight sum of the four component scores.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{ComponentScores, Dimension};

/// Per-dimension weights. Must be non-negative and sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionWeights {
    pub grammar: f64,
    pub structure: f64,
    pub language_strength: f64,
    pub keywords: f64,
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            grammar: 0.25,
            structure: 0.25,
            language_strength: 0.25,
            keywords: 0.25,
        }
    }
}

impl DimensionWeights {
    pub fn weight(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Grammar => self.grammar,
            Dimension::Structure => self.structure,
            Dimension::LanguageStrength => self.language_strength,
            Dimension::Keywords => self.keywords,
        }
    }

    fn weight_mut(&mut self, dimension: Dimension) -> &mut f64 {
        match dimension {
            Dimension::Grammar => &mut self.grammar,
            Dimension::Structure => &mut self.structure,
            Dimension::LanguageStrength => &mut self.language_strength,
            Dimension::Keywords => &mut self.keywords,
        }
    }

    /// Parses `grammar=0.3,structure=0.3,language_strength=0.2,keywords=0.2`.
    /// Every dimension must be named exactly once.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut weights = DimensionWeights {
            grammar: f64::NAN,
            structure: f64::NAN,
            language_strength: f64::NAN,
            keywords: f64::NAN,
        };
        for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = pair
                .split_once('=')
                .with_context(|| format!("expected name=value, got '{pair}'"))?;
            let dimension = Dimension::parse(name)
                .with_context(|| format!("unknown dimension '{}'", name.trim()))?;
            let value: f64 = value
                .trim()
                .parse()
                .with_context(|| format!("weight for '{dimension}' is not a number"))?;
            let slot = weights.weight_mut(dimension);
            if !slot.is_nan() {
                bail!("dimension '{dimension}' is listed twice");
            }
            *slot = value;
        }
        if let Some(missing) = Dimension::ALL.iter().find(|d| weights.weight(**d).is_nan()) {
            bail!("no weight given for dimension '{missing}'");
        }
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<()> {
        let mut sum = 0.0;
        for dimension in Dimension::ALL {
            let w = self.weight(dimension);
            if !w.is_finite() || w < 0.0 {
                bail!("weight for '{dimension}' must be a non-negative number, got {w}");
            }
            sum += w;
        }
        if (sum - 1.0).abs() > 1e-6 {
            bail!("dimension weights must sum to 1, got {sum}");
        }
        Ok(())
    }
}

/// Computes the overall score, rounded to one decimal and clamped to [0, 100].
///
/// An unavailable dimension is given the weight-normalised mean of the
/// available ones before summing. Returns the scores as reported, neutral
/// values filled in, so the overall is always their weighted sum. The input
/// is left untouched.
pub fn aggregate(scores: &ComponentScores, weights: &DimensionWeights) -> (ComponentScores, f64) {
    let (weighted, weight_sum) = scores
        .iter()
        .filter(|s| s.available)
        .fold((0.0, 0.0), |(acc, ws), s| {
            let w = weights.weight(s.dimension);
            (acc + w * s.value, ws + w)
        });
    let neutral = if weight_sum > 0.0 {
        weighted / weight_sum
    } else {
        0.0
    };

    let mut reported = scores.clone();
    for dimension in Dimension::ALL {
        let score = reported.get_mut(dimension);
        if !score.available {
            score.value = neutral;
        }
    }

    let total: f64 = reported
        .iter()
        .map(|s| weights.weight(s.dimension) * s.value)
        .sum();
    let overall = ((total * 10.0).round() / 10.0).clamp(0.0, 100.0);
    (reported, overall)
}
