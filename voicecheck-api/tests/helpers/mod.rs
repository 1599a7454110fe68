//! Test Helper Utilities
//!
//! Shared utilities for testing voicecheck-api

use std::f64::consts::PI;
use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use voicecheck_api::AppState;
use voicecheck_core::Analyzer;

pub const TEST_API_KEY: &str = "test-key-12345";

/// State with the advanced pipeline and `TEST_API_KEY`
pub fn test_app_state() -> AppState {
    AppState::new(Analyzer::advanced(), TEST_API_KEY)
}

/// `seconds` of a steady sine whose period divides the analysis hop
pub fn steady_tone_wav(seconds: f64) -> Vec<u8> {
    let sample_rate = 22050u32;
    let freq = sample_rate as f64 * 10.0 / 512.0;
    let n = (seconds * sample_rate as f64) as usize;

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..n {
            let t = i as f64 / sample_rate as f64;
            writer
                .write_sample((0.8 * (2.0 * PI * freq * t).sin()) as f32)
                .unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
