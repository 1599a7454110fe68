//! Named feature vector and table-driven key access

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dsp::stats::mean;

/// Acoustic summary statistics for one clip
///
/// Scalars are means / standard deviations / variances over analysis frames.
/// The MFCC fields hold one value per coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub spectral_centroid_mean: f64,
    pub spectral_centroid_std: f64,
    pub spectral_centroid_var: f64,
    pub spectral_rolloff_mean: f64,
    pub spectral_rolloff_std: f64,
    pub spectral_bandwidth_mean: f64,
    pub spectral_bandwidth_std: f64,
    pub spectral_contrast_mean: f64,
    pub spectral_flatness_mean: f64,

    pub zcr_mean: f64,
    pub zcr_std: f64,
    pub zcr_var: f64,

    pub mfcc_mean: Vec<f64>,
    pub mfcc_std: Vec<f64>,
    pub mfcc_var: Vec<f64>,

    pub chroma_mean: f64,
    pub chroma_std: f64,

    pub rms_mean: f64,
    pub rms_std: f64,
    pub rms_var: f64,

    /// All three are 0 when no voiced frame was found
    pub pitch_mean: f64,
    pub pitch_std: f64,
    pub pitch_var: f64,
    pub voiced_frames: usize,

    pub onset_strength_mean: f64,
    pub onset_strength_std: f64,

    pub harmonic_ratio: f64,
    pub energy_consistency: f64,

    /// Number of STFT frames analysed
    pub frame_count: usize,
}

/// Feature lookup key used by rule tables
///
/// Array-valued features (the per-coefficient MFCC statistics) resolve to
/// the mean across coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKey {
    SpectralCentroidMean,
    SpectralCentroidStd,
    SpectralCentroidVar,
    SpectralRolloffMean,
    SpectralRolloffStd,
    SpectralBandwidthMean,
    SpectralBandwidthStd,
    SpectralContrastMean,
    SpectralFlatnessMean,
    ZcrMean,
    ZcrStd,
    ZcrVar,
    MfccMean,
    MfccStd,
    MfccVar,
    ChromaMean,
    ChromaStd,
    RmsMean,
    RmsStd,
    RmsVar,
    PitchMean,
    PitchStd,
    PitchVar,
    OnsetStrengthMean,
    OnsetStrengthStd,
    HarmonicRatio,
    EnergyConsistency,
}

impl FeatureKey {
    pub const ALL: [FeatureKey; 27] = [
        FeatureKey::SpectralCentroidMean,
        FeatureKey::SpectralCentroidStd,
        FeatureKey::SpectralCentroidVar,
        FeatureKey::SpectralRolloffMean,
        FeatureKey::SpectralRolloffStd,
        FeatureKey::SpectralBandwidthMean,
        FeatureKey::SpectralBandwidthStd,
        FeatureKey::SpectralContrastMean,
        FeatureKey::SpectralFlatnessMean,
        FeatureKey::ZcrMean,
        FeatureKey::ZcrStd,
        FeatureKey::ZcrVar,
        FeatureKey::MfccMean,
        FeatureKey::MfccStd,
        FeatureKey::MfccVar,
        FeatureKey::ChromaMean,
        FeatureKey::ChromaStd,
        FeatureKey::RmsMean,
        FeatureKey::RmsStd,
        FeatureKey::RmsVar,
        FeatureKey::PitchMean,
        FeatureKey::PitchStd,
        FeatureKey::PitchVar,
        FeatureKey::OnsetStrengthMean,
        FeatureKey::OnsetStrengthStd,
        FeatureKey::HarmonicRatio,
        FeatureKey::EnergyConsistency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKey::SpectralCentroidMean => "spectral_centroid_mean",
            FeatureKey::SpectralCentroidStd => "spectral_centroid_std",
            FeatureKey::SpectralCentroidVar => "spectral_centroid_var",
            FeatureKey::SpectralRolloffMean => "spectral_rolloff_mean",
            FeatureKey::SpectralRolloffStd => "spectral_rolloff_std",
            FeatureKey::SpectralBandwidthMean => "spectral_bandwidth_mean",
            FeatureKey::SpectralBandwidthStd => "spectral_bandwidth_std",
            FeatureKey::SpectralContrastMean => "spectral_contrast_mean",
            FeatureKey::SpectralFlatnessMean => "spectral_flatness_mean",
            FeatureKey::ZcrMean => "zcr_mean",
            FeatureKey::ZcrStd => "zcr_std",
            FeatureKey::ZcrVar => "zcr_var",
            FeatureKey::MfccMean => "mfcc_mean",
            FeatureKey::MfccStd => "mfcc_std",
            FeatureKey::MfccVar => "mfcc_var",
            FeatureKey::ChromaMean => "chroma_mean",
            FeatureKey::ChromaStd => "chroma_std",
            FeatureKey::RmsMean => "rms_mean",
            FeatureKey::RmsStd => "rms_std",
            FeatureKey::RmsVar => "rms_var",
            FeatureKey::PitchMean => "pitch_mean",
            FeatureKey::PitchStd => "pitch_std",
            FeatureKey::PitchVar => "pitch_var",
            FeatureKey::OnsetStrengthMean => "onset_strength_mean",
            FeatureKey::OnsetStrengthStd => "onset_strength_std",
            FeatureKey::HarmonicRatio => "harmonic_ratio",
            FeatureKey::EnergyConsistency => "energy_consistency",
        }
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FeatureVector {
    /// Scalar view of a feature
    pub fn get(&self, key: FeatureKey) -> f64 {
        match key {
            FeatureKey::SpectralCentroidMean => self.spectral_centroid_mean,
            FeatureKey::SpectralCentroidStd => self.spectral_centroid_std,
            FeatureKey::SpectralCentroidVar => self.spectral_centroid_var,
            FeatureKey::SpectralRolloffMean => self.spectral_rolloff_mean,
            FeatureKey::SpectralRolloffStd => self.spectral_rolloff_std,
            FeatureKey::SpectralBandwidthMean => self.spectral_bandwidth_mean,
            FeatureKey::SpectralBandwidthStd => self.spectral_bandwidth_std,
            FeatureKey::SpectralContrastMean => self.spectral_contrast_mean,
            FeatureKey::SpectralFlatnessMean => self.spectral_flatness_mean,
            FeatureKey::ZcrMean => self.zcr_mean,
            FeatureKey::ZcrStd => self.zcr_std,
            FeatureKey::ZcrVar => self.zcr_var,
            FeatureKey::MfccMean => mean(&self.mfcc_mean),
            FeatureKey::MfccStd => mean(&self.mfcc_std),
            FeatureKey::MfccVar => mean(&self.mfcc_var),
            FeatureKey::ChromaMean => self.chroma_mean,
            FeatureKey::ChromaStd => self.chroma_std,
            FeatureKey::RmsMean => self.rms_mean,
            FeatureKey::RmsStd => self.rms_std,
            FeatureKey::RmsVar => self.rms_var,
            FeatureKey::PitchMean => self.pitch_mean,
            FeatureKey::PitchStd => self.pitch_std,
            FeatureKey::PitchVar => self.pitch_var,
            FeatureKey::OnsetStrengthMean => self.onset_strength_mean,
            FeatureKey::OnsetStrengthStd => self.onset_strength_std,
            FeatureKey::HarmonicRatio => self.harmonic_ratio,
            FeatureKey::EnergyConsistency => self.energy_consistency,
        }
    }

    /// First feature holding NaN or infinity, if any
    pub fn first_non_finite(&self) -> Option<FeatureKey> {
        let arrays_finite = self
            .mfcc_mean
            .iter()
            .chain(&self.mfcc_std)
            .chain(&self.mfcc_var)
            .all(|v| v.is_finite());
        if !arrays_finite {
            return Some(FeatureKey::MfccMean);
        }
        FeatureKey::ALL
            .iter()
            .copied()
            .find(|&key| !self.get(key).is_finite())
    }

    /// A vector with every statistic at zero and `n_mfcc` coefficients
    pub fn zeroed(n_mfcc: usize) -> Self {
        Self {
            spectral_centroid_mean: 0.0,
            spectral_centroid_std: 0.0,
            spectral_centroid_var: 0.0,
            spectral_rolloff_mean: 0.0,
            spectral_rolloff_std: 0.0,
            spectral_bandwidth_mean: 0.0,
            spectral_bandwidth_std: 0.0,
            spectral_contrast_mean: 0.0,
            spectral_flatness_mean: 0.0,
            zcr_mean: 0.0,
            zcr_std: 0.0,
            zcr_var: 0.0,
            mfcc_mean: vec![0.0; n_mfcc],
            mfcc_std: vec![0.0; n_mfcc],
            mfcc_var: vec![0.0; n_mfcc],
            chroma_mean: 0.0,
            chroma_std: 0.0,
            rms_mean: 0.0,
            rms_std: 0.0,
            rms_var: 0.0,
            pitch_mean: 0.0,
            pitch_std: 0.0,
            pitch_var: 0.0,
            voiced_frames: 0,
            onset_strength_mean: 0.0,
            onset_strength_std: 0.0,
            harmonic_ratio: 0.0,
            energy_consistency: 0.0,
            frame_count: 0,
        }
    }
}
