//! Mel-scale filterbank, dB conversion and DCT for cepstral analysis.

use std::f64::consts::PI;

use super::AMIN;

/// Dynamic range kept by `power_to_db`
pub const TOP_DB: f64 = 80.0;

/// Converts frequency in Hz to mel scale.
pub fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Converts mel scale frequency back to Hz.
pub fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10.0_f64.powf(mel / 2595.0) - 1.0)
}

/// Creates the mel filterbank matrix.
///
/// Returns `[num_mels][n_fft / 2 + 1]` triangular filters spanning
/// `low_freq..high_freq`.
pub fn mel_filter_bank(
    num_mels: usize,
    n_fft: usize,
    sample_rate: u32,
    low_freq: f64,
    high_freq: f64,
) -> Vec<Vec<f64>> {
    let half_fft = n_fft / 2 + 1;
    let low_mel = hz_to_mel(low_freq);
    let high_mel = hz_to_mel(high_freq);

    let step = (high_mel - low_mel) / (num_mels + 1) as f64;
    let mut bins: Vec<usize> = (0..num_mels + 2)
        .map(|i| {
            let hz = mel_to_hz(low_mel + i as f64 * step);
            let bin = (hz * n_fft as f64 / sample_rate as f64).round() as usize;
            bin.min(half_fft - 1)
        })
        .collect();

    // Every filter needs at least one bin of width
    for i in 1..bins.len() {
        if bins[i] <= bins[i - 1] {
            bins[i] = bins[i - 1] + 1;
        }
    }

    (0..num_mels)
        .map(|m| {
            let mut filter = vec![0.0f64; half_fft];
            let (left, center, right) = (bins[m], bins[m + 1], bins[m + 2]);

            for k in left..center.min(half_fft) {
                filter[k] = (k - left) as f64 / (center - left) as f64;
            }
            for k in center..=right.min(half_fft - 1) {
                filter[k] = (right - k) as f64 / (right - center) as f64;
            }
            filter
        })
        .collect()
}

/// Apply a filterbank to a power spectrogram: `[frame][band]`
pub fn apply_filter_bank(power: &[Vec<f64>], bank: &[Vec<f64>]) -> Vec<Vec<f64>> {
    power
        .iter()
        .map(|frame| {
            bank.iter()
                .map(|filter| filter.iter().zip(frame).map(|(w, p)| w * p).sum())
                .collect()
        })
        .collect()
}

/// Convert power values to dB (ref 1.0), floored at `max - TOP_DB`
///
/// The floor is taken over the whole matrix, not per frame.
pub fn power_to_db(power: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let mut db: Vec<Vec<f64>> = power
        .iter()
        .map(|frame| frame.iter().map(|&p| 10.0 * p.max(AMIN).log10()).collect())
        .collect();

    let max = db
        .iter()
        .flatten()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    if max.is_finite() {
        let floor = max - TOP_DB;
        for v in db.iter_mut().flatten() {
            *v = v.max(floor);
        }
    }
    db
}

/// Orthonormal DCT-II basis, `[num_coefficients][input_len]`
pub fn dct_matrix(num_coefficients: usize, input_len: usize) -> Vec<Vec<f64>> {
    let n = input_len as f64;
    (0..num_coefficients)
        .map(|k| {
            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            (0..input_len)
                .map(|i| scale * (PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n)).cos())
                .collect()
        })
        .collect()
}
