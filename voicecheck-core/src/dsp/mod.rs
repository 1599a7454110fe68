//! DSP primitives used by the feature extractor
//!
//! Hand-written, dependency-free building blocks: FFT, framing and STFT,
//! mel filterbank with dB conversion and DCT, and summary statistics.

pub mod fft;
pub mod mel;
pub mod stats;
pub mod stft;

pub use stats::Summary;
pub use stft::{frame_count, frames, hann_window, Spectrogram};

/// Additive guard used by every ratio in the engine
pub const EPSILON: f64 = 1e-6;

/// Power floor used before taking logarithms
pub const AMIN: f64 = 1e-10;
