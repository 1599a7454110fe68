//! Synthetic speech-like test signals
//!
//! All generators are deterministic: noise comes from a seeded `StdRng`.

use std::f64::consts::PI;
use std::io::Cursor;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Frequency whose period divides `hop` evenly, so every analysis frame of a
/// sine at this frequency holds the same samples
pub fn hop_aligned_frequency(sample_rate: u32, hop: usize, periods_per_hop: usize) -> f64 {
    sample_rate as f64 * periods_per_hop as f64 / hop as f64
}

/// Constant-amplitude sine tone
pub fn sine(freq: f64, sample_rate: u32, seconds: f64, amplitude: f32) -> Vec<f32> {
    let n = (seconds * sample_rate as f64) as usize;
    (0..n)
        .map(|i| amplitude * (2.0 * PI * freq * i as f64 / sample_rate as f64).sin() as f32)
        .collect()
}

/// White noise under a random piecewise-constant envelope
///
/// The envelope changes every 4096..8192 samples. Every third segment is
/// exact silence, the others take a random gain in 0.05..1.0.
///
/// The silent segments are what keep the centroid, zero-crossing and
/// rolloff rules from passing: those measures ignore gain, so noise under
/// a smooth envelope that never goes quiet passes 3-4 rules and lands near
/// 0.55-0.65 HUMAN confidence instead of at most 2 rules.
pub fn modulated_noise(sample_rate: u32, seconds: f64, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = (seconds * sample_rate as f64) as usize;
    let mut samples = Vec::with_capacity(n);

    let mut index = 0usize;
    while samples.len() < n {
        let segment = rng.gen_range(4096..8192).min(n - samples.len());
        index += 1;
        let gain: f32 = if index % 3 == 2 {
            0.0
        } else {
            rng.gen_range(0.05..1.0)
        };
        for _ in 0..segment {
            let noise: f32 = rng.gen_range(-1.0..1.0);
            samples.push(gain * noise);
        }
    }
    samples
}

/// Encode samples as a 32-bit float WAV held in memory
///
/// `channels > 1` duplicates the mono signal into every channel.
pub fn wav_bytes(samples: &[f32], sample_rate: u32, channels: u16) -> anyhow::Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &s in samples {
            for _ in 0..channels {
                writer.write_sample(s)?;
            }
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Write a mono 32-bit float WAV file
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> anyhow::Result<()> {
    std::fs::write(path, wav_bytes(samples, sample_rate, 1)?)?;
    Ok(())
}
