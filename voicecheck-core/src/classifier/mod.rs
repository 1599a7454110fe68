//! Heuristic AI-voice classification
//!
//! Evaluates a [`RuleSet`] over a [`FeatureVector`] and maps the aggregate
//! score to a label, a confidence and an explanation. Pure and stateless:
//! the same vector always yields the same [`Verdict`].

pub mod rules;

pub use rules::{Comparator, Guard, Metric, RuleOutcome, RuleSet, ScoreRule, Scoring};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::features::FeatureVector;

/// Confidence never exceeds this
pub const MAX_CONFIDENCE: f64 = 0.95;

const PROPORTIONAL_SLOPE: f64 = 0.9;
const REASONS_CITED: usize = 3;

const AI_FALLBACK: &str = "Audio exhibits characteristics typical of AI-generated speech.";
const AI_SUFFIX: &str =
    "Exhibits synthetic speech patterns with high regularity and reduced natural variation.";
const HUMAN_DETAILED: &str = "Audio demonstrates natural human speech patterns with organic \
variations in pitch, energy, and spectral features. Shows expected inconsistencies and dynamic \
range typical of human vocal production.";
const AI_FIXED: &str = "Audio exhibits characteristics typical of AI-generated speech: high \
spectral consistency, uniform energy distribution, and reduced natural variation.";
const HUMAN_FIXED: &str = "Audio shows natural human speech characteristics: varied spectral \
patterns, dynamic energy levels, and organic pitch variations.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "AI_GENERATED")]
    AiGenerated,
    #[serde(rename = "HUMAN")]
    Human,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::AiGenerated => "AI_GENERATED",
            Classification::Human => "HUMAN",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full scoring detail behind a verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub rule_set: String,
    pub scoring: Scoring,
    /// Sum of passed rule weights
    pub score: f64,
    pub total_weight: f64,
    /// score / total_weight, always in [0, 1]
    pub probability: f64,
    pub classification: Classification,
    /// Unrounded, in [0.5, 0.95]
    pub confidence: f64,
    /// Reasons of passing rules, in table order
    pub reasons: Vec<String>,
    /// Names of rules whose guard did not hold
    pub skipped: Vec<String>,
}

/// Client-facing decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub classification: Classification,
    /// Rounded to two decimals
    pub confidence: f64,
    pub explanation: String,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl RuleSet {
    /// Score `features` against every rule in order
    pub fn evaluate(&self, features: &FeatureVector) -> Assessment {
        let mut score = 0.0;
        let mut reasons = Vec::new();
        let mut skipped = Vec::new();

        for rule in &self.rules {
            match rule.evaluate(features) {
                RuleOutcome::Passed => {
                    score += rule.weight;
                    reasons.push(rule.reason.clone());
                }
                RuleOutcome::Failed => {}
                RuleOutcome::Skipped => skipped.push(rule.name.clone()),
            }
        }

        let total_weight = self.total_weight();
        let probability = if total_weight > 0.0 {
            (score / total_weight).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let decision_value = match self.scoring {
            Scoring::Proportional => probability,
            Scoring::Additive => score,
        };
        let is_ai = decision_value > self.threshold;

        let confidence = match (self.scoring, is_ai) {
            (Scoring::Proportional, _) => {
                0.5 + (decision_value - self.threshold).abs() * PROPORTIONAL_SLOPE
            }
            (Scoring::Additive, true) => 0.5 + score,
            (Scoring::Additive, false) => 1.5 - score,
        }
        .clamp(0.5, MAX_CONFIDENCE);

        Assessment {
            rule_set: self.name.clone(),
            scoring: self.scoring,
            score,
            total_weight,
            probability,
            classification: if is_ai {
                Classification::AiGenerated
            } else {
                Classification::Human
            },
            confidence,
            reasons,
            skipped,
        }
    }

    /// Evaluate and reduce to a verdict
    pub fn classify(&self, features: &FeatureVector) -> Verdict {
        self.evaluate(features).verdict()
    }
}

impl Assessment {
    pub fn verdict(&self) -> Verdict {
        Verdict {
            classification: self.classification,
            confidence: round2(self.confidence),
            explanation: self.explanation(),
        }
    }

    fn explanation(&self) -> String {
        match (self.scoring, self.classification) {
            (Scoring::Proportional, Classification::AiGenerated) => {
                if self.reasons.is_empty() {
                    AI_FALLBACK.to_string()
                } else {
                    let cited: Vec<&str> = self
                        .reasons
                        .iter()
                        .take(REASONS_CITED)
                        .map(String::as_str)
                        .collect();
                    format!(
                        "Audio shows {} AI-generated characteristics: {}. {}",
                        self.reasons.len(),
                        cited.join(", "),
                        AI_SUFFIX
                    )
                }
            }
            (Scoring::Proportional, Classification::Human) => HUMAN_DETAILED.to_string(),
            (Scoring::Additive, Classification::AiGenerated) => AI_FIXED.to_string(),
            (Scoring::Additive, Classification::Human) => HUMAN_FIXED.to_string(),
        }
    }
}

/// Classify with the built-in advanced rule table
pub fn classify(features: &FeatureVector) -> Verdict {
    RuleSet::advanced().classify(features)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Vector that passes every advanced rule
    fn synthetic_ai() -> FeatureVector {
        let mut fv = FeatureVector::zeroed(20);
        fv.spectral_centroid_mean = 1000.0;
        fv.spectral_centroid_std = 10.0;
        fv.zcr_mean = 0.1;
        fv.zcr_std = 0.001;
        fv.mfcc_var = vec![1.0; 20];
        fv.energy_consistency = 0.01;
        fv.pitch_mean = 200.0;
        fv.pitch_std = 1.0;
        fv.spectral_flatness_mean = 0.001;
        fv.rms_mean = 0.3;
        fv.rms_std = 0.001;
        fv.spectral_rolloff_mean = 2000.0;
        fv.spectral_rolloff_std = 1.0;
        fv.harmonic_ratio = 0.8;
        fv
    }

    /// Vector that fails every advanced rule
    fn synthetic_human() -> FeatureVector {
        let mut fv = FeatureVector::zeroed(20);
        fv.spectral_centroid_mean = 1000.0;
        fv.spectral_centroid_std = 800.0;
        fv.zcr_mean = 0.1;
        fv.zcr_std = 0.1;
        fv.mfcc_var = vec![400.0; 20];
        fv.energy_consistency = 1.2;
        fv.pitch_mean = 200.0;
        fv.pitch_std = 90.0;
        fv.spectral_flatness_mean = 0.4;
        fv.rms_mean = 0.1;
        fv.rms_std = 0.1;
        fv.spectral_rolloff_mean = 2000.0;
        fv.spectral_rolloff_std = 1500.0;
        fv.harmonic_ratio = 0.3;
        fv
    }

    #[test]
    fn test_all_rules_pass() {
        let assessment = RuleSet::advanced().evaluate(&synthetic_ai());
        assert_eq!(assessment.score, 9.0);
        assert_eq!(assessment.probability, 1.0);

        let verdict = assessment.verdict();
        assert_eq!(verdict.classification, Classification::AiGenerated);
        assert_eq!(verdict.confidence, 0.95);
        assert_eq!(
            verdict.explanation,
            "Audio shows 9 AI-generated characteristics: very consistent spectral \
             characteristics, uniform zero-crossing rate, low MFCC variation. Exhibits \
             synthetic speech patterns with high regularity and reduced natural variation."
        );
    }

    #[test]
    fn test_no_rules_pass() {
        let verdict = classify(&synthetic_human());
        assert_eq!(verdict.classification, Classification::Human);
        assert_eq!(verdict.confidence, 0.95);
        assert!(verdict.explanation.starts_with("Audio demonstrates natural human speech"));
    }

    #[test]
    fn test_exact_half_is_human() {
        // 3 of 6 rules passing puts the probability exactly on the threshold
        let mut set = RuleSet::advanced();
        set.rules.truncate(6);
        let mut fv = synthetic_ai();
        fv.energy_consistency = 1.0;
        fv.pitch_std = 100.0;
        fv.spectral_flatness_mean = 0.5;

        let assessment = set.evaluate(&fv);
        assert_eq!(assessment.probability, 0.5);
        assert_eq!(assessment.classification, Classification::Human);
        assert_eq!(assessment.verdict().confidence, 0.5);
    }

    #[test]
    fn test_unvoiced_skips_pitch_rule() {
        let mut fv = synthetic_ai();
        fv.pitch_mean = 0.0;
        fv.pitch_std = 0.0;
        let assessment = RuleSet::advanced().evaluate(&fv);
        assert_eq!(assessment.skipped, vec!["pitch_variation".to_string()]);
        assert_eq!(assessment.score, 8.0);
        assert_eq!(assessment.total_weight, 9.0);
        assert!(!assessment.reasons.iter().any(|r| r == "minimal pitch variation"));
    }

    #[test]
    fn test_zero_means_do_not_panic() {
        let mut fv = FeatureVector::zeroed(20);
        fv.spectral_centroid_std = 1.0;
        fv.rms_std = 1.0;
        let verdict = classify(&fv);
        assert!((0.5..=0.95).contains(&verdict.confidence));
    }

    #[test]
    fn test_eight_of_nine() {
        let mut fv = synthetic_ai();
        fv.harmonic_ratio = 0.99;
        let verdict = classify(&fv);
        assert_eq!(verdict.classification, Classification::AiGenerated);
        assert_eq!(verdict.confidence, 0.85);
        assert!(verdict.explanation.starts_with("Audio shows 8 AI-generated"));
    }

    #[test]
    fn test_confidence_bounds_over_every_score() {
        let set = RuleSet::advanced();
        for passed in 0..=9usize {
            let mut fv = synthetic_human();
            let ai = synthetic_ai();
            // Copy over the fields of the first `passed` rules
            let fields: [fn(&mut FeatureVector, &FeatureVector); 9] = [
                |d, s| d.spectral_centroid_std = s.spectral_centroid_std,
                |d, s| d.zcr_std = s.zcr_std,
                |d, s| d.mfcc_var = s.mfcc_var.clone(),
                |d, s| d.energy_consistency = s.energy_consistency,
                |d, s| d.pitch_std = s.pitch_std,
                |d, s| d.spectral_flatness_mean = s.spectral_flatness_mean,
                |d, s| d.rms_std = s.rms_std,
                |d, s| d.spectral_rolloff_std = s.spectral_rolloff_std,
                |d, s| d.harmonic_ratio = s.harmonic_ratio,
            ];
            for copy in fields.iter().take(passed) {
                copy(&mut fv, &ai);
            }
            let assessment = set.evaluate(&fv);
            assert_eq!(assessment.score, passed as f64);
            assert!((0.0..=1.0).contains(&assessment.probability));
            assert!((0.5..=0.95).contains(&assessment.confidence));
            assert_eq!(
                assessment.classification == Classification::AiGenerated,
                passed >= 5
            );
        }
    }

    #[test]
    fn test_basic_scoring() {
        let mut fv = FeatureVector::zeroed(13);
        fv.spectral_centroid_mean = 1000.0;
        fv.spectral_centroid_std = 10.0;
        fv.zcr_mean = 0.1;
        fv.zcr_std = 0.001;
        fv.mfcc_std = vec![80.0; 13];
        fv.rms_mean = 0.1;
        fv.rms_std = 0.1;
        fv.chroma_mean = 0.1;

        // 0.3 + 0.2 = 0.5 is not above the threshold
        let verdict = RuleSet::basic().classify(&fv);
        assert_eq!(verdict.classification, Classification::Human);
        assert_eq!(verdict.confidence, 0.95);
        assert_eq!(verdict.explanation, HUMAN_FIXED);

        fv.chroma_mean = 0.5;
        let assessment = RuleSet::basic().evaluate(&fv);
        assert!((assessment.score - 0.65).abs() < 1e-12);
        assert_eq!(assessment.classification, Classification::AiGenerated);
        assert_eq!(assessment.verdict().explanation, AI_FIXED);
        assert_eq!(assessment.verdict().confidence, 0.95);
    }

    #[test]
    fn test_classification_wire_names() {
        assert_eq!(
            serde_json::to_string(&Classification::AiGenerated).unwrap(),
            "\"AI_GENERATED\""
        );
        assert_eq!(serde_json::to_string(&Classification::Human).unwrap(), "\"HUMAN\"");
    }

    #[test]
    fn test_determinism() {
        let fv = synthetic_ai();
        assert_eq!(classify(&fv), classify(&fv));
    }
}
