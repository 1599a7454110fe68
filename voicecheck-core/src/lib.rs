//! # voicecheck-core
//!
//! Decision engine for the voice-origin detector:
//! - Audio decoding to a mono waveform (symphonia + rubato)
//! - DSP primitives (FFT, STFT, mel filterbank, DCT)
//! - Acoustic feature extraction into a fixed `FeatureVector`
//! - Table-driven heuristic scoring into a `Verdict`
//!
//! Everything in this crate is synchronous and request-local. Callers that run
//! inside an async runtime should move `Analyzer::analyze_bytes` onto a
//! blocking thread.

pub mod audio;
pub mod classifier;
pub mod dsp;
pub mod error;
pub mod features;
pub mod pipeline;

pub use audio::{AudioDecoder, SymphoniaDecoder, Waveform};
pub use classifier::{classify, Assessment, Classification, RuleSet, ScoreRule, Verdict};
pub use error::{Error, Result};
pub use features::{extract_features, ExtractorConfig, FeatureExtractor, FeatureKey, FeatureVector};
pub use pipeline::{Analysis, Analyzer};
