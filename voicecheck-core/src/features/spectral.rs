//! Spectral shape features computed per STFT frame

use crate::dsp::{stats::mean, Summary, AMIN};

/// Per-clip spectral statistics
#[derive(Debug, Clone, Default)]
pub struct SpectralFeatures {
    pub centroid: Summary,
    pub rolloff: Summary,
    pub bandwidth: Summary,
    pub contrast_mean: f64,
    pub flatness_mean: f64,
}

/// Octave sub-band layout for spectral contrast
#[derive(Debug, Clone, Copy)]
pub struct ContrastBands {
    pub fmin: f64,
    pub n_bands: usize,
    pub quantile: f64,
}

/// Compute centroid, rolloff, bandwidth, contrast and flatness
///
/// `mags` is `[frame][bin]` magnitude; `freqs` the bin centre frequencies.
pub fn spectral_features(
    mags: &[Vec<f64>],
    freqs: &[f64],
    rolloff_percent: f64,
    bands: ContrastBands,
) -> SpectralFeatures {
    let mut centroids = Vec::with_capacity(mags.len());
    let mut rolloffs = Vec::with_capacity(mags.len());
    let mut bandwidths = Vec::with_capacity(mags.len());
    let mut contrasts = Vec::with_capacity(mags.len());
    let mut flatness = Vec::with_capacity(mags.len());

    for frame in mags {
        let c = centroid(frame, freqs);
        centroids.push(c);
        bandwidths.push(bandwidth(frame, freqs, c));
        rolloffs.push(rolloff(frame, freqs, rolloff_percent));
        contrasts.push(mean(&contrast(frame, freqs, bands)));
        flatness.push(flatness_of(frame));
    }

    SpectralFeatures {
        centroid: Summary::of(&centroids),
        rolloff: Summary::of(&rolloffs),
        bandwidth: Summary::of(&bandwidths),
        contrast_mean: mean(&contrasts),
        flatness_mean: mean(&flatness),
    }
}

/// Magnitude-weighted mean frequency; 0 for a silent frame
pub fn centroid(frame: &[f64], freqs: &[f64]) -> f64 {
    let total: f64 = frame.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    frame.iter().zip(freqs).map(|(m, f)| m * f).sum::<f64>() / total
}

/// Magnitude-weighted spread around the centroid
pub fn bandwidth(frame: &[f64], freqs: &[f64], centroid: f64) -> f64 {
    let total: f64 = frame.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let spread: f64 = frame
        .iter()
        .zip(freqs)
        .map(|(m, f)| (m / total) * (f - centroid).powi(2))
        .sum();
    spread.sqrt()
}

/// Lowest frequency below which `percent` of the magnitude lies
pub fn rolloff(frame: &[f64], freqs: &[f64], percent: f64) -> f64 {
    let total: f64 = frame.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let threshold = percent * total;
    let mut cumulative = 0.0;
    for (m, f) in frame.iter().zip(freqs) {
        cumulative += m;
        if cumulative >= threshold {
            return *f;
        }
    }
    freqs.last().copied().unwrap_or(0.0)
}

/// Geometric over arithmetic mean of the floored power spectrum
pub fn flatness_of(frame: &[f64]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }
    let n = frame.len() as f64;
    let power: Vec<f64> = frame.iter().map(|m| (m * m).max(AMIN)).collect();
    let log_mean = power.iter().map(|p| p.ln()).sum::<f64>() / n;
    let arith = power.iter().sum::<f64>() / n;
    log_mean.exp() / arith
}

/// Peak-to-valley dB contrast for each octave sub-band
///
/// Bands are `[0, fmin)`, `[fmin, 2 fmin)`, ... and a final band that runs
/// to Nyquist.
pub fn contrast(frame: &[f64], freqs: &[f64], bands: ContrastBands) -> Vec<f64> {
    let mut edges = vec![0.0];
    edges.extend((0..=bands.n_bands).map(|i| bands.fmin * 2f64.powi(i as i32)));

    let mut out = Vec::with_capacity(bands.n_bands + 1);
    for k in 0..=bands.n_bands {
        let low = edges[k];
        let high = edges[k + 1];
        let last = k == bands.n_bands;

        let mut band: Vec<f64> = frame
            .iter()
            .zip(freqs)
            .filter(|(_, &f)| f >= low && (last || f < high))
            .map(|(&m, _)| m)
            .collect();
        if band.is_empty() {
            continue;
        }

        band.sort_by(|a, b| a.total_cmp(b));
        let idx = ((bands.quantile * band.len() as f64).round() as usize).max(1);
        let valley = mean(&band[..idx]);
        let peak = mean(&band[band.len() - idx..]);

        out.push(10.0 * peak.max(AMIN).log10() - 10.0 * valley.max(AMIN).log10());
    }
    out
}
