//! Acoustic feature extraction
//!
//! Turns a mono waveform into a [`FeatureVector`] of frame-level summary
//! statistics. Every measure shares one STFT (periodic Hann window, no
//! centre padding) so a stationary input gives identical frames.
//!
//! Feature groups:
//! - Spectral shape: centroid, bandwidth, rolloff, contrast, flatness
//! - Temporal: zero-crossing rate, RMS, frame-energy consistency
//! - Cepstral: MFCC per-coefficient mean / std / var
//! - Tonal: chroma, dominant pitch, harmonic ratio (HPSS)
//! - Onset strength envelope

pub mod cepstral;
pub mod chroma;
pub mod harmonic;
pub mod pitch;
pub mod spectral;
pub mod temporal;
pub mod vector;

pub use vector::{FeatureKey, FeatureVector};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audio::Waveform;
use crate::dsp::mel::mel_filter_bank;
use crate::dsp::Spectrogram;
use crate::{Error, Result};
use pitch::PitchRange;
use spectral::ContrastBands;

/// Analysis parameters
///
/// Every field has a default, so a partial TOML table is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub n_fft: usize,
    pub hop_length: usize,
    pub n_mfcc: usize,
    pub n_mels: usize,
    pub rolloff_percent: f64,
    pub pitch_fmin: f64,
    pub pitch_fmax: f64,
    pub pitch_threshold: f64,
    /// Median filter length for harmonic / percussive separation (odd)
    pub hpss_kernel: usize,
    pub contrast_fmin: f64,
    pub contrast_bands: usize,
    pub contrast_quantile: f64,
    /// Framing of the energy-consistency measure
    pub energy_frame_length: usize,
    pub energy_hop_length: usize,
    /// Longest clip accepted, in seconds; every STFT-sized buffer grows
    /// linearly with it
    pub max_duration_seconds: f64,
}

/// Default clip length limit (five minutes)
pub const DEFAULT_MAX_DURATION_SECONDS: f64 = 300.0;

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self::advanced()
    }
}

impl ExtractorConfig {
    /// 20 cepstral coefficients
    pub fn advanced() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            n_mfcc: 20,
            n_mels: 128,
            rolloff_percent: 0.85,
            pitch_fmin: 150.0,
            pitch_fmax: 4000.0,
            pitch_threshold: 0.1,
            hpss_kernel: 31,
            contrast_fmin: 200.0,
            contrast_bands: 6,
            contrast_quantile: 0.02,
            energy_frame_length: 2048,
            energy_hop_length: 512,
            max_duration_seconds: DEFAULT_MAX_DURATION_SECONDS,
        }
    }

    /// 13 cepstral coefficients, otherwise identical to `advanced`
    pub fn basic() -> Self {
        Self {
            n_mfcc: 13,
            ..Self::advanced()
        }
    }

    /// Check parameter consistency
    pub fn validate(&self) -> Result<()> {
        if !self.n_fft.is_power_of_two() || self.n_fft < 4 {
            return Err(Error::Config(format!(
                "n_fft must be a power of two >= 4, got {}",
                self.n_fft
            )));
        }
        if self.hop_length == 0 || self.energy_hop_length == 0 || self.energy_frame_length == 0 {
            return Err(Error::Config("Frame and hop lengths must be positive".to_string()));
        }
        if self.n_mels == 0 || self.n_mfcc == 0 || self.n_mfcc > self.n_mels {
            return Err(Error::Config(format!(
                "Need 0 < n_mfcc <= n_mels, got n_mfcc={} n_mels={}",
                self.n_mfcc, self.n_mels
            )));
        }
        if !(self.rolloff_percent > 0.0 && self.rolloff_percent <= 1.0) {
            return Err(Error::Config(format!(
                "rolloff_percent must be in (0, 1], got {}",
                self.rolloff_percent
            )));
        }
        if !(self.pitch_fmin >= 0.0 && self.pitch_fmin < self.pitch_fmax) {
            return Err(Error::Config(format!(
                "Invalid pitch range {}..{} Hz",
                self.pitch_fmin, self.pitch_fmax
            )));
        }
        if !(0.0..=1.0).contains(&self.pitch_threshold) {
            return Err(Error::Config(format!(
                "pitch_threshold must be in [0, 1], got {}",
                self.pitch_threshold
            )));
        }
        if self.hpss_kernel == 0 || self.hpss_kernel % 2 == 0 {
            return Err(Error::Config(format!(
                "hpss_kernel must be odd, got {}",
                self.hpss_kernel
            )));
        }
        if self.contrast_fmin <= 0.0
            || self.contrast_bands == 0
            || !(self.contrast_quantile > 0.0 && self.contrast_quantile < 1.0)
        {
            return Err(Error::Config("Invalid spectral contrast bands".to_string()));
        }
        if !(self.max_duration_seconds > 0.0) {
            return Err(Error::Config(format!(
                "max_duration_seconds must be positive, got {}",
                self.max_duration_seconds
            )));
        }
        Ok(())
    }

    /// Reject clips longer than `max_duration_seconds`
    pub fn check_duration(&self, num_samples: usize, sample_rate: u32) -> Result<()> {
        if sample_rate == 0 {
            return Err(Error::FeatureExtraction("Sample rate is zero".to_string()));
        }
        let duration = num_samples as f64 / sample_rate as f64;
        if duration > self.max_duration_seconds {
            return Err(Error::FeatureExtraction(format!(
                "Clip too long: {:.1} s, limit is {:.1} s",
                duration, self.max_duration_seconds
            )));
        }
        Ok(())
    }

    fn contrast(&self) -> ContrastBands {
        ContrastBands {
            fmin: self.contrast_fmin,
            n_bands: self.contrast_bands,
            quantile: self.contrast_quantile,
        }
    }

    fn pitch_range(&self) -> PitchRange {
        PitchRange {
            fmin: self.pitch_fmin,
            fmax: self.pitch_fmax,
            threshold: self.pitch_threshold,
        }
    }
}

/// Computes a [`FeatureVector`] from a waveform
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: ExtractorConfig,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self {
            config: ExtractorConfig::advanced(),
        }
    }
}

impl FeatureExtractor {
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn advanced() -> Self {
        Self::default()
    }

    pub fn basic() -> Self {
        Self {
            config: ExtractorConfig::basic(),
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract all features
    ///
    /// # Errors
    /// `Error::FeatureExtraction` for a zero sample rate, an empty or
    /// non-finite signal, a signal shorter than one analysis frame or longer
    /// than `max_duration_seconds`, or a non-finite result.
    pub fn extract(&self, waveform: &Waveform) -> Result<FeatureVector> {
        let cfg = &self.config;
        let samples = waveform.samples.as_slice();
        let sample_rate = waveform.sample_rate;

        if sample_rate == 0 {
            return Err(Error::FeatureExtraction("Sample rate is zero".to_string()));
        }
        if samples.is_empty() {
            return Err(Error::FeatureExtraction("Empty signal".to_string()));
        }
        cfg.check_duration(samples.len(), sample_rate)?;
        if let Some(pos) = samples.iter().position(|s| !s.is_finite()) {
            return Err(Error::FeatureExtraction(format!(
                "Non-finite sample at index {}",
                pos
            )));
        }
        if samples.len() < cfg.energy_frame_length {
            return Err(Error::FeatureExtraction(format!(
                "Signal too short: {} samples, need at least {}",
                samples.len(),
                cfg.energy_frame_length
            )));
        }

        let spectrogram = Spectrogram::compute(samples, sample_rate, cfg.n_fft, cfg.hop_length)?;
        let magnitudes = spectrogram.magnitudes();
        let power: Vec<Vec<f64>> = magnitudes
            .iter()
            .map(|frame| frame.iter().map(|m| m * m).collect())
            .collect();
        let freqs = spectrogram.bin_frequencies();

        let spectral = spectral::spectral_features(
            &magnitudes,
            &freqs,
            cfg.rolloff_percent,
            cfg.contrast(),
        );
        let zcr = temporal::zero_crossing_rate(samples, cfg.n_fft, cfg.hop_length);
        let rms = temporal::rms(samples, cfg.n_fft, cfg.hop_length);
        let energy_consistency = temporal::energy_consistency(
            samples,
            cfg.energy_frame_length,
            cfg.energy_hop_length,
        );

        let bank = mel_filter_bank(
            cfg.n_mels,
            cfg.n_fft,
            sample_rate,
            0.0,
            sample_rate as f64 / 2.0,
        );
        let mel_db = cepstral::mel_db(&power, &bank);
        let mfcc = cepstral::summarize(&cepstral::mfcc(&mel_db, cfg.n_mfcc), cfg.n_mfcc);
        let onset = temporal::onset_strength(&mel_db);

        let chroma = chroma::chroma_summary(&power, &freqs);
        let pitch = pitch::pitch_track(&magnitudes, &freqs, cfg.pitch_range());
        let harmonic_ratio = harmonic::harmonic_ratio(samples, &spectrogram, cfg.hpss_kernel)?;

        let features = FeatureVector {
            spectral_centroid_mean: spectral.centroid.mean,
            spectral_centroid_std: spectral.centroid.std,
            spectral_centroid_var: spectral.centroid.var,
            spectral_rolloff_mean: spectral.rolloff.mean,
            spectral_rolloff_std: spectral.rolloff.std,
            spectral_bandwidth_mean: spectral.bandwidth.mean,
            spectral_bandwidth_std: spectral.bandwidth.std,
            spectral_contrast_mean: spectral.contrast_mean,
            spectral_flatness_mean: spectral.flatness_mean,
            zcr_mean: zcr.mean,
            zcr_std: zcr.std,
            zcr_var: zcr.var,
            mfcc_mean: mfcc.mean,
            mfcc_std: mfcc.std,
            mfcc_var: mfcc.var,
            chroma_mean: chroma.mean,
            chroma_std: chroma.std,
            rms_mean: rms.mean,
            rms_std: rms.std,
            rms_var: rms.var,
            pitch_mean: pitch.summary.mean,
            pitch_std: pitch.summary.std,
            pitch_var: pitch.summary.var,
            voiced_frames: pitch.voiced_frames,
            onset_strength_mean: onset.mean,
            onset_strength_std: onset.std,
            harmonic_ratio,
            energy_consistency,
            frame_count: spectrogram.num_frames(),
        };

        if let Some(key) = features.first_non_finite() {
            return Err(Error::FeatureExtraction(format!(
                "Feature {} is not finite",
                key
            )));
        }

        debug!(
            frames = features.frame_count,
            voiced = features.voiced_frames,
            centroid = features.spectral_centroid_mean,
            harmonic_ratio = features.harmonic_ratio,
            "Extracted features"
        );

        Ok(features)
    }
}

/// Extract the advanced feature set from raw mono samples
pub fn extract_features(samples: &[f32], sample_rate: u32) -> Result<FeatureVector> {
    FeatureExtractor::advanced().extract(&Waveform::new(samples.to_vec(), sample_rate))
}
