//! Mel spectrogram and cepstral coefficients

use crate::dsp::mel::{apply_filter_bank, dct_matrix, power_to_db};
use crate::dsp::Summary;

/// Per-coefficient statistics across frames
#[derive(Debug, Clone, Default)]
pub struct CepstralFeatures {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
    pub var: Vec<f64>,
}

/// dB mel spectrogram, `[frame][band]`
pub fn mel_db(power: &[Vec<f64>], bank: &[Vec<f64>]) -> Vec<Vec<f64>> {
    power_to_db(&apply_filter_bank(power, bank))
}

/// MFCC matrix `[frame][coefficient]` from a dB mel spectrogram
pub fn mfcc(mel_db: &[Vec<f64>], n_mfcc: usize) -> Vec<Vec<f64>> {
    let n_mels = mel_db.first().map(Vec::len).unwrap_or(0);
    let basis = dct_matrix(n_mfcc, n_mels);
    mel_db
        .iter()
        .map(|frame| {
            basis
                .iter()
                .map(|row| row.iter().zip(frame).map(|(b, x)| b * x).sum())
                .collect()
        })
        .collect()
}

/// Reduce an MFCC matrix to per-coefficient mean / std / var
pub fn summarize(coefficients: &[Vec<f64>], n_mfcc: usize) -> CepstralFeatures {
    let mut out = CepstralFeatures {
        mean: Vec::with_capacity(n_mfcc),
        std: Vec::with_capacity(n_mfcc),
        var: Vec::with_capacity(n_mfcc),
    };
    for c in 0..n_mfcc {
        let track: Vec<f64> = coefficients.iter().map(|frame| frame[c]).collect();
        let summary = Summary::of(&track);
        out.mean.push(summary.mean);
        out.std.push(summary.std);
        out.var.push(summary.var);
    }
    out
}
