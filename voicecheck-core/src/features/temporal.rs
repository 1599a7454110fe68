//! Time-domain and envelope features

use crate::dsp::{frames, stats::mean, Summary, EPSILON};

/// Fraction of sign changes per frame
///
/// Zero counts as positive, so a run of silence has no crossings.
pub fn zero_crossing_rate(samples: &[f32], frame_length: usize, hop: usize) -> Summary {
    let rates: Vec<f64> = frames(samples, frame_length, hop)
        .map(|frame| {
            let crossings = frame
                .windows(2)
                .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
                .count();
            crossings as f64 / frame_length as f64
        })
        .collect();
    Summary::of(&rates)
}

/// Root-mean-square energy per frame
pub fn rms(samples: &[f32], frame_length: usize, hop: usize) -> Summary {
    let values: Vec<f64> = frames(samples, frame_length, hop)
        .map(|frame| {
            let sum_squares: f64 = frame.iter().map(|&s| (s as f64).powi(2)).sum();
            (sum_squares / frame.len() as f64).sqrt()
        })
        .collect();
    Summary::of(&values)
}

/// Relative spread of per-frame energy: std / (mean + epsilon)
///
/// Frame energy is the plain sum of squares.
pub fn energy_consistency(samples: &[f32], frame_length: usize, hop: usize) -> f64 {
    let energies: Vec<f64> = frames(samples, frame_length, hop)
        .map(|frame| frame.iter().map(|&s| (s as f64).powi(2)).sum())
        .collect();
    let summary = Summary::of(&energies);
    summary.std / (summary.mean + EPSILON)
}

/// Onset strength envelope from a dB mel spectrogram (`[frame][band]`)
///
/// Each value is the mean over bands of the positive first difference.
/// A single-frame input yields one zero value.
pub fn onset_strength(mel_db: &[Vec<f64>]) -> Summary {
    if mel_db.len() < 2 {
        return Summary::of(&vec![0.0; mel_db.len()]);
    }
    let envelope: Vec<f64> = mel_db
        .windows(2)
        .map(|pair| {
            let rises: Vec<f64> = pair[1]
                .iter()
                .zip(&pair[0])
                .map(|(now, before)| (now - before).max(0.0))
                .collect();
            mean(&rises)
        })
        .collect();
    Summary::of(&envelope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zcr_alternating_signal() {
        let samples: Vec<f32> = (0..4096).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let zcr = zero_crossing_rate(&samples, 2048, 512);
        assert!((zcr.mean - 2047.0 / 2048.0).abs() < 1e-12);
        assert!(zcr.std < 1e-12);
    }

    #[test]
    fn test_zcr_silence_is_zero() {
        let zcr = zero_crossing_rate(&[0.0; 4096], 2048, 512);
        assert_eq!(zcr.mean, 0.0);
    }

    #[test]
    fn test_rms_of_constant() {
        let r = rms(&[0.5; 4096], 2048, 512);
        assert!((r.mean - 0.5).abs() < 1e-12);
        assert!(r.std < 1e-12);
    }

    #[test]
    fn test_energy_consistency_detects_level_change() {
        let steady = vec![0.5f32; 8192];
        assert!(energy_consistency(&steady, 2048, 512) < 1e-9);

        let mut stepped = vec![0.1f32; 4096];
        stepped.extend(vec![0.9f32; 4096]);
        assert!(energy_consistency(&stepped, 2048, 512) > 0.5);
    }

    #[test]
    fn test_energy_consistency_of_silence_is_finite() {
        let value = energy_consistency(&[0.0; 4096], 2048, 512);
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_onset_strength_rectifies() {
        let mel = vec![vec![0.0, 0.0], vec![10.0, 0.0], vec![0.0, 0.0]];
        let onset = onset_strength(&mel);
        // rises: [5.0, 0.0]
        assert!((onset.mean - 2.5).abs() < 1e-12);
        assert!((onset.std - 2.5).abs() < 1e-12);
    }
}
