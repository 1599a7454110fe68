//! Mono PCM waveform

use serde::{Deserialize, Serialize};

/// Decoded mono audio
///
/// Created once per request by the decoder and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waveform {
    /// Mono samples (f32, nominal range [-1.0, 1.0])
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .fold(0.0f32, |peak, &s| peak.max(s.abs()))
    }

    /// Peak-normalise so that max |x| == 1.0
    ///
    /// A silent (all-zero) waveform is returned unchanged.
    pub fn normalized(mut self) -> Self {
        let peak = self.peak();
        if peak > 0.0 && peak.is_finite() {
            let gain = 1.0 / peak;
            for sample in &mut self.samples {
                *sample *= gain;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        let wave = Waveform::new(vec![0.0; 22050], 22050);
        assert!((wave.duration_seconds() - 1.0).abs() < 1e-12);
        assert_eq!(Waveform::new(vec![0.0; 10], 0).duration_seconds(), 0.0);
    }

    #[test]
    fn test_normalized_scales_to_unit_peak() {
        let wave = Waveform::new(vec![0.1, -0.25, 0.2], 8000).normalized();
        assert!((wave.peak() - 1.0).abs() < 1e-6);
        assert!((wave.samples[1] + 1.0).abs() < 1e-6);
        assert!((wave.samples[0] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_normalized_leaves_silence_alone() {
        let wave = Waveform::new(vec![0.0; 64], 8000).normalized();
        assert!(wave.samples.iter().all(|&s| s == 0.0));
    }
}
