//! Table-driven scoring rules
//!
//! A [`RuleSet`] is plain data: an ordered list of predicates over named
//! features plus a scoring mode. The two built-in tables reproduce the
//! advanced and basic detectors; other tables can be loaded from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dsp::EPSILON;
use crate::features::{FeatureKey, FeatureVector};
use crate::{Error, Result};

/// Scalar derived from a feature vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Metric {
    /// The feature value itself
    Raw { key: FeatureKey },
    /// std / (mean + epsilon)
    CoefficientOfVariation { std: FeatureKey, mean: FeatureKey },
}

impl Metric {
    pub fn value(&self, features: &FeatureVector) -> f64 {
        match *self {
            Metric::Raw { key } => features.get(key),
            Metric::CoefficientOfVariation { std, mean } => {
                features.get(std) / (features.get(mean) + EPSILON)
            }
        }
    }
}

/// Threshold test applied to a metric value
///
/// All comparisons are strict; NaN never matches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Comparator {
    LessThan { value: f64 },
    GreaterThan { value: f64 },
    /// Exclusive on both ends
    Between { low: f64, high: f64 },
}

impl Comparator {
    pub fn matches(&self, x: f64) -> bool {
        match *self {
            Comparator::LessThan { value } => x < value,
            Comparator::GreaterThan { value } => x > value,
            Comparator::Between { low, high } => low < x && x < high,
        }
    }

    fn bounds(&self) -> Vec<f64> {
        match *self {
            Comparator::LessThan { value } | Comparator::GreaterThan { value } => vec![value],
            Comparator::Between { low, high } => vec![low, high],
        }
    }
}

/// Precondition for evaluating a rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Guard {
    /// Feature must be strictly positive
    Positive { key: FeatureKey },
}

impl Guard {
    pub fn holds(&self, features: &FeatureVector) -> bool {
        match *self {
            Guard::Positive { key } => features.get(key) > 0.0,
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

/// One predicate contributing `weight` to the AI score when it passes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRule {
    pub name: String,
    pub metric: Metric,
    pub comparator: Comparator,
    #[serde(default = "default_weight")]
    pub weight: f64,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<Guard>,
}

/// Result of evaluating one rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    Passed,
    Failed,
    /// Guard did not hold; the rule still counts toward the total weight
    Skipped,
}

impl ScoreRule {
    fn new(
        name: &str,
        metric: Metric,
        comparator: Comparator,
        weight: f64,
        reason: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            metric,
            comparator,
            weight,
            reason: reason.to_string(),
            guard: None,
        }
    }

    fn guarded(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn evaluate(&self, features: &FeatureVector) -> RuleOutcome {
        if let Some(guard) = &self.guard {
            if !guard.holds(features) {
                return RuleOutcome::Skipped;
            }
        }
        if self.comparator.matches(self.metric.value(features)) {
            RuleOutcome::Passed
        } else {
            RuleOutcome::Failed
        }
    }
}

/// How passed weight turns into a decision and a confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    /// Decision on passed / total weight; confidence grows with the
    /// distance from the threshold. Explanations cite passing reasons.
    Proportional,
    /// Decision on the raw sum of passed weights; confidence is
    /// `0.5 + score` (AI) or `1.5 - score` (human). Fixed explanations.
    Additive,
}

/// Named, ordered rule table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub name: String,
    /// Decision value must exceed this to classify as AI-generated
    pub threshold: f64,
    pub scoring: Scoring,
    pub rules: Vec<ScoreRule>,
}

fn cv(std: FeatureKey, mean: FeatureKey) -> Metric {
    Metric::CoefficientOfVariation { std, mean }
}

fn raw(key: FeatureKey) -> Metric {
    Metric::Raw { key }
}

fn below(value: f64) -> Comparator {
    Comparator::LessThan { value }
}

impl RuleSet {
    /// Nine equally weighted consistency checks
    pub fn advanced() -> Self {
        use FeatureKey::*;
        Self {
            name: "advanced".to_string(),
            threshold: 0.5,
            scoring: Scoring::Proportional,
            rules: vec![
                ScoreRule::new(
                    "spectral_consistency",
                    cv(SpectralCentroidStd, SpectralCentroidMean),
                    below(0.12),
                    1.0,
                    "very consistent spectral characteristics",
                ),
                ScoreRule::new(
                    "zcr_uniformity",
                    cv(ZcrStd, ZcrMean),
                    below(0.35),
                    1.0,
                    "uniform zero-crossing rate",
                ),
                ScoreRule::new(
                    "mfcc_variance",
                    raw(MfccVar),
                    below(40.0),
                    1.0,
                    "low MFCC variation",
                ),
                ScoreRule::new(
                    "energy_consistency",
                    raw(EnergyConsistency),
                    below(0.25),
                    1.0,
                    "highly consistent energy levels",
                ),
                ScoreRule::new(
                    "pitch_variation",
                    cv(PitchStd, PitchMean),
                    below(0.15),
                    1.0,
                    "minimal pitch variation",
                )
                .guarded(Guard::Positive { key: PitchMean }),
                ScoreRule::new(
                    "spectral_flatness",
                    raw(SpectralFlatnessMean),
                    below(0.05),
                    1.0,
                    "low spectral flatness (tonal)",
                ),
                ScoreRule::new(
                    "rms_stability",
                    cv(RmsStd, RmsMean),
                    below(0.28),
                    1.0,
                    "stable RMS energy",
                ),
                ScoreRule::new(
                    "rolloff_consistency",
                    cv(SpectralRolloffStd, SpectralRolloffMean),
                    below(0.10),
                    1.0,
                    "consistent spectral rolloff",
                ),
                ScoreRule::new(
                    "harmonic_ratio",
                    raw(HarmonicRatio),
                    Comparator::Between {
                        low: 0.6,
                        high: 0.95,
                    },
                    1.0,
                    "high harmonic content",
                ),
            ],
        }
    }

    /// Five weighted checks summing to 1.0
    pub fn basic() -> Self {
        use FeatureKey::*;
        Self {
            name: "basic".to_string(),
            threshold: 0.5,
            scoring: Scoring::Additive,
            rules: vec![
                ScoreRule::new(
                    "spectral_consistency",
                    cv(SpectralCentroidStd, SpectralCentroidMean),
                    below(0.15),
                    0.3,
                    "high spectral consistency",
                ),
                ScoreRule::new(
                    "zcr_consistency",
                    cv(ZcrStd, ZcrMean),
                    below(0.4),
                    0.2,
                    "uniform zero-crossing rate",
                ),
                ScoreRule::new(
                    "mfcc_deviation",
                    raw(MfccStd),
                    below(50.0),
                    0.2,
                    "low MFCC variation",
                ),
                ScoreRule::new(
                    "rms_consistency",
                    cv(RmsStd, RmsMean),
                    below(0.3),
                    0.15,
                    "uniform energy distribution",
                ),
                ScoreRule::new(
                    "chroma_balance",
                    raw(ChromaMean),
                    Comparator::Between {
                        low: 0.3,
                        high: 0.7,
                    },
                    0.15,
                    "balanced chroma profile",
                ),
            ],
        }
    }

    /// Built-in table by name
    pub fn by_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "advanced" => Ok(Self::advanced()),
            "basic" => Ok(Self::basic()),
            other => Err(Error::Config(format!(
                "Unknown rule set '{}' (expected 'advanced' or 'basic')",
                other
            ))),
        }
    }

    /// Parse and validate a TOML rule table
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let set: Self = toml::from_str(text)
            .map_err(|e| Error::Config(format!("Invalid rule table: {}", e)))?;
        set.validate()?;
        Ok(set)
    }

    /// Load a TOML rule table from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize rule table: {}", e)))
    }

    /// Sum of all rule weights, skipped rules included
    pub fn total_weight(&self) -> f64 {
        self.rules.iter().map(|r| r.weight).sum()
    }

    pub fn validate(&self) -> Result<()> {
        if self.rules.is_empty() {
            return Err(Error::Config(format!("Rule set '{}' has no rules", self.name)));
        }
        if !self.threshold.is_finite() {
            return Err(Error::Config(format!(
                "Rule set '{}' has a non-finite threshold",
                self.name
            )));
        }
        for rule in &self.rules {
            if !rule.weight.is_finite() || rule.weight < 0.0 {
                return Err(Error::Config(format!(
                    "Rule '{}' has invalid weight {}",
                    rule.name, rule.weight
                )));
            }
            if rule.comparator.bounds().iter().any(|b| !b.is_finite()) {
                return Err(Error::Config(format!(
                    "Rule '{}' has a non-finite threshold",
                    rule.name
                )));
            }
            if let Comparator::Between { low, high } = rule.comparator {
                if low >= high {
                    return Err(Error::Config(format!(
                        "Rule '{}' has an empty range {}..{}",
                        rule.name, low, high
                    )));
                }
            }
        }
        if self.total_weight() <= 0.0 {
            return Err(Error::Config(format!(
                "Rule set '{}' has zero total weight",
                self.name
            )));
        }
        Ok(())
    }
}
