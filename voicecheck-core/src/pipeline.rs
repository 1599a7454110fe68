//! Decode → extract → classify

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audio::{resample_mono, AudioDecoder, SymphoniaDecoder, Waveform};
use crate::classifier::{Assessment, RuleSet, Verdict};
use crate::features::{ExtractorConfig, FeatureExtractor, FeatureVector};
use crate::Result;

/// Sample rate the advanced pipeline analyses at
pub const ANALYSIS_SAMPLE_RATE: u32 = 22050;

/// Everything produced for one clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub sample_rate: u32,
    pub duration_seconds: f64,
    pub features: FeatureVector,
    pub assessment: Assessment,
    pub verdict: Verdict,
}

/// Configured detection pipeline
///
/// Holds no per-request state; one instance can serve any number of
/// concurrent callers.
pub struct Analyzer {
    decoder: Box<dyn AudioDecoder>,
    extractor: FeatureExtractor,
    rules: RuleSet,
    target_sample_rate: Option<u32>,
    normalize: bool,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::advanced()
    }
}

impl Analyzer {
    /// 22050 Hz, peak-normalised, 20 MFCC, nine-rule table
    pub fn advanced() -> Self {
        Self {
            decoder: Box::new(SymphoniaDecoder::new()),
            extractor: FeatureExtractor::advanced(),
            rules: RuleSet::advanced(),
            target_sample_rate: Some(ANALYSIS_SAMPLE_RATE),
            normalize: true,
        }
    }

    /// Native rate, no normalisation, 13 MFCC, five weighted rules
    pub fn basic() -> Self {
        Self {
            decoder: Box::new(SymphoniaDecoder::new()),
            extractor: FeatureExtractor::basic(),
            rules: RuleSet::basic(),
            target_sample_rate: None,
            normalize: false,
        }
    }

    /// Preset by rule-set name
    pub fn for_rule_set(name: &str) -> Result<Self> {
        let rules = RuleSet::by_name(name)?;
        Ok(if rules.name == "basic" {
            Self::basic()
        } else {
            Self::advanced()
        })
    }

    pub fn with_decoder(mut self, decoder: impl AudioDecoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    pub fn with_extractor(mut self, extractor: FeatureExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Change the clip length limit, keeping every other analysis parameter
    pub fn with_max_duration(self, seconds: f64) -> Result<Self> {
        let config = ExtractorConfig {
            max_duration_seconds: seconds,
            ..self.extractor.config().clone()
        };
        let extractor = FeatureExtractor::new(config)?;
        Ok(self.with_extractor(extractor))
    }

    /// Replace the rule table; the table is validated first
    pub fn with_rules(mut self, rules: RuleSet) -> Result<Self> {
        rules.validate()?;
        self.rules = rules;
        Ok(self)
    }

    pub fn with_target_sample_rate(mut self, rate: Option<u32>) -> Self {
        self.target_sample_rate = rate;
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    /// Decode an encoded clip and classify it
    ///
    /// # Errors
    /// `Error::Decode` for unreadable audio, `Error::FeatureExtraction` for a
    /// signal the extractor cannot analyse.
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<Analysis> {
        let start = Instant::now();
        let waveform = self.decoder.decode(bytes, None, true)?;
        debug!(
            bytes = bytes.len(),
            samples = waveform.len(),
            sample_rate = waveform.sample_rate,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Decoded clip"
        );

        // Length limit applies before resampling allocates the output
        self.extractor
            .config()
            .check_duration(waveform.len(), waveform.sample_rate)?;

        let waveform = match self.target_sample_rate {
            Some(target) if target != waveform.sample_rate => {
                let source = waveform.sample_rate;
                Waveform::new(resample_mono(waveform.samples, source, target)?, target)
            }
            _ => waveform,
        };
        self.analyze_waveform(waveform)
    }

    /// Classify an already decoded waveform
    pub fn analyze_waveform(&self, waveform: Waveform) -> Result<Analysis> {
        let waveform = if self.normalize {
            waveform.normalized()
        } else {
            waveform
        };

        let start = Instant::now();
        let features = self.extractor.extract(&waveform)?;
        debug!(
            frames = features.frame_count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Extracted features"
        );

        let assessment = self.rules.evaluate(&features);
        let verdict = assessment.verdict();
        debug!(
            rule_set = %assessment.rule_set,
            score = assessment.score,
            total = assessment.total_weight,
            classification = %verdict.classification,
            confidence = verdict.confidence,
            "Classified clip"
        );

        Ok(Analysis {
            sample_rate: waveform.sample_rate,
            duration_seconds: waveform.duration_seconds(),
            features,
            assessment,
            verdict,
        })
    }
}
