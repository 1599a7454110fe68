//! Harmonic / percussive separation by median filtering
//!
//! Harmonic energy is smooth along time, percussive energy is smooth along
//! frequency. Median-filtering the magnitude spectrogram in each direction
//! gives the two estimates; a soft mask built from them is applied to the
//! complex STFT and inverted to recover the harmonic waveform.

use crate::dsp::{Spectrogram, EPSILON};
use crate::Result;

/// Reflect an out-of-range index back into `0..n` (edge sample repeated)
fn reflect(i: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let m = i.rem_euclid(period) as usize;
    if m >= n {
        2 * n - 1 - m
    } else {
        m
    }
}

/// Median of a sequence using `scratch` as working space
fn median(scratch: &mut [f64]) -> f64 {
    let mid = scratch.len() / 2;
    let (_, value, _) = scratch.select_nth_unstable_by(mid, f64::total_cmp);
    *value
}

/// Median filter of a 1-D sequence with an odd kernel and reflected edges
pub fn median_filter(values: &[f64], kernel: usize) -> Vec<f64> {
    let n = values.len();
    if n == 0 || kernel <= 1 {
        return values.to_vec();
    }
    let half = (kernel / 2) as isize;
    let mut window = vec![0.0; 2 * half as usize + 1];
    (0..n as isize)
        .map(|i| {
            for (slot, offset) in window.iter_mut().zip(-half..=half) {
                *slot = values[reflect(i + offset, n)];
            }
            median(&mut window)
        })
        .collect()
}

/// Soft harmonic mask `[frame][bin]`: H² / (H² + P²)
///
/// Cells where both estimates vanish get 0.
pub fn harmonic_mask(magnitudes: &[Vec<f64>], kernel: usize) -> Vec<Vec<f64>> {
    let frames = magnitudes.len();
    let bins = magnitudes.first().map(Vec::len).unwrap_or(0);

    // Horizontal (time) filtering per bin
    let mut harmonic = vec![vec![0.0; bins]; frames];
    let mut track = vec![0.0; frames];
    for k in 0..bins {
        for (t, frame) in magnitudes.iter().enumerate() {
            track[t] = frame[k];
        }
        for (t, v) in median_filter(&track, kernel).into_iter().enumerate() {
            harmonic[t][k] = v;
        }
    }

    // Vertical (frequency) filtering per frame
    let percussive: Vec<Vec<f64>> = magnitudes
        .iter()
        .map(|frame| median_filter(frame, kernel))
        .collect();

    harmonic
        .iter()
        .zip(&percussive)
        .map(|(h_frame, p_frame)| {
            h_frame
                .iter()
                .zip(p_frame)
                .map(|(&h, &p)| {
                    if h.max(p) < f64::MIN_POSITIVE {
                        0.0
                    } else {
                        let (h2, p2) = (h * h, p * p);
                        h2 / (h2 + p2)
                    }
                })
                .collect()
        })
        .collect()
}

/// Harmonic waveform recovered from `spectrogram`
pub fn harmonic_component(spectrogram: &Spectrogram, kernel: usize) -> Result<Vec<f64>> {
    let mask = harmonic_mask(&spectrogram.magnitudes(), kernel);
    let mut masked = spectrogram.clone();
    for (frame, weights) in masked.frames.iter_mut().zip(&mask) {
        for ((re, im), &w) in frame.re.iter_mut().zip(frame.im.iter_mut()).zip(weights) {
            *re *= w;
            *im *= w;
        }
    }
    masked.inverse()
}

/// Σ|harmonic| / (Σ|signal| + epsilon), capped at 1
///
/// Masking smears energy towards the tapered frame edges, where the
/// overlap-add normalisation can lift it above the input level.
pub fn harmonic_ratio(samples: &[f32], spectrogram: &Spectrogram, kernel: usize) -> Result<f64> {
    let harmonic: f64 = harmonic_component(spectrogram, kernel)?
        .iter()
        .map(|v| v.abs())
        .sum();
    let total: f64 = samples.iter().map(|&s| (s as f64).abs()).sum();
    Ok((harmonic / (total + EPSILON)).min(1.0))
}
