//! Test Helper Utilities
//!
//! Shared utilities for testing voicecheck-core

pub mod audio_generator;

pub use audio_generator::{hop_aligned_frequency, modulated_noise, sine, wav_bytes, write_wav};
