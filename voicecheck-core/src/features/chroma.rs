//! Pitch-class energy profile

use crate::dsp::Summary;

const A4_HZ: f64 = 440.0;

/// Pitch class (0 = C) of a frequency, or `None` for DC
fn pitch_class(freq: f64) -> Option<usize> {
    if freq <= 0.0 {
        return None;
    }
    let semitones_from_a4 = (12.0 * (freq / A4_HZ).log2()).round() as i64;
    Some((semitones_from_a4 + 9).rem_euclid(12) as usize)
}

/// Chromagram `[frame][12]`, each frame scaled so its largest class is 1
///
/// A silent frame stays all zero.
pub fn chromagram(power: &[Vec<f64>], freqs: &[f64]) -> Vec<[f64; 12]> {
    let classes: Vec<Option<usize>> = freqs.iter().map(|&f| pitch_class(f)).collect();
    power
        .iter()
        .map(|frame| {
            let mut chroma = [0.0f64; 12];
            for (p, class) in frame.iter().zip(&classes) {
                if let Some(c) = class {
                    chroma[*c] += p;
                }
            }
            let max = chroma.iter().copied().fold(0.0, f64::max);
            if max > 0.0 {
                chroma.iter_mut().for_each(|v| *v /= max);
            }
            chroma
        })
        .collect()
}

/// Mean and spread over every (frame, class) cell
pub fn chroma_summary(power: &[Vec<f64>], freqs: &[f64]) -> Summary {
    let cells: Vec<f64> = chromagram(power, freqs)
        .into_iter()
        .flat_map(|frame| frame.into_iter())
        .collect();
    Summary::of(&cells)
}
