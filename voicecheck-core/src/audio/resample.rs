//! Sample-rate conversion with rubato

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

use crate::{Error, Result};

/// Resample mono PCM samples from `source_rate` to `target_rate`
///
/// **Algorithm:**
/// - Sinc interpolation with BlackmanHarris2 window, 256 taps
/// - 0.95 cutoff frequency to prevent aliasing
/// - Single pass: chunk size equals input length
///
/// Returns the input unchanged when the rates already match.
pub fn resample_mono(samples: Vec<f32>, source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    if samples.is_empty() || source_rate == target_rate {
        return Ok(samples);
    }
    if source_rate == 0 || target_rate == 0 {
        return Err(Error::Decode(format!(
            "Cannot resample between {} Hz and {} Hz",
            source_rate, target_rate
        )));
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = target_rate as f64 / source_rate as f64;
    let num_frames = samples.len();

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, num_frames, 1)
        .map_err(|e| Error::Decode(format!("Failed to create resampler: {}", e)))?;

    let input = vec![samples];
    let mut output = resampler
        .process(&input, None)
        .map_err(|e| Error::Decode(format!("Resampling failed: {}", e)))?;

    let resampled = output.pop().unwrap_or_default();

    debug!(
        "Resampled {} frames ({} Hz) -> {} frames ({} Hz)",
        num_frames,
        source_rate,
        resampled.len(),
        target_rate
    );

    Ok(resampled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_rate_is_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        let out = resample_mono(samples.clone(), 22050, 22050).unwrap();
        assert_eq!(out, samples);
    }

    #[test]
    fn test_downsample_halves_length() {
        let samples: Vec<f32> = (0..44100)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
            .collect();
        let out = resample_mono(samples, 44100, 22050).unwrap();
        let expected = 22050.0;
        assert!(
            (out.len() as f64 - expected).abs() / expected < 0.02,
            "unexpected output length {}",
            out.len()
        );
    }

    #[test]
    fn test_zero_rate_rejected() {
        assert!(resample_mono(vec![0.5; 16], 0, 22050).is_err());
    }
}
