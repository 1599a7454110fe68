//! Audio input: decoding, resampling, and the mono waveform type

pub mod decoder;
pub mod resample;
pub mod waveform;

pub use decoder::{AudioDecoder, SymphoniaDecoder};
pub use resample::resample_mono;
pub use waveform::Waveform;
