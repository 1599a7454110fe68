//! Per-frame dominant pitch from spectral peaks

use crate::dsp::Summary;

/// Search band and peak threshold for pitch tracking
#[derive(Debug, Clone, Copy)]
pub struct PitchRange {
    pub fmin: f64,
    pub fmax: f64,
    /// Peaks below `threshold * frame max` are ignored
    pub threshold: f64,
}

/// Pitch statistics over voiced frames
#[derive(Debug, Clone, Copy, Default)]
pub struct PitchTrack {
    pub summary: Summary,
    pub voiced_frames: usize,
}

/// Strongest interpolated peak of one magnitude frame, as `(hz, magnitude)`
///
/// A peak is a bin strictly greater than its lower neighbour and no less
/// than its upper neighbour. Its position is refined by a parabola through
/// the three bins.
pub fn dominant_peak(frame: &[f64], freqs: &[f64], range: PitchRange) -> Option<(f64, f64)> {
    if frame.len() < 3 {
        return None;
    }
    let frame_max = frame.iter().copied().fold(0.0, f64::max);
    let floor = range.threshold * frame_max;
    let bin_width = if freqs.len() > 1 { freqs[1] - freqs[0] } else { 0.0 };

    let mut best: Option<(f64, f64)> = None;
    for k in 1..frame.len() - 1 {
        if freqs[k] < range.fmin || freqs[k] >= range.fmax {
            continue;
        }
        let (prev, here, next) = (frame[k - 1], frame[k], frame[k + 1]);
        if !(here > prev && here >= next && here > floor) {
            continue;
        }

        let avg = 0.5 * (next - prev);
        let denom = 2.0 * here - next - prev;
        let shift = if denom.abs() > f64::MIN_POSITIVE { avg / denom } else { 0.0 };
        let magnitude = here + 0.5 * avg * shift;
        let hz = (k as f64 + shift) * bin_width;

        if best.map_or(true, |(_, m)| magnitude > m) {
            best = Some((hz, magnitude));
        }
    }
    best
}

/// Track the dominant pitch across frames; unvoiced frames are dropped
pub fn pitch_track(magnitudes: &[Vec<f64>], freqs: &[f64], range: PitchRange) -> PitchTrack {
    let pitches: Vec<f64> = magnitudes
        .iter()
        .filter_map(|frame| dominant_peak(frame, freqs, range))
        .map(|(hz, _)| hz)
        .filter(|&hz| hz > 0.0)
        .collect();
    PitchTrack {
        summary: Summary::of(&pitches),
        voiced_frames: pitches.len(),
    }
}
