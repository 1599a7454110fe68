//! Audio decoding from in-memory bytes
//!
//! **Purpose:** Turn an uploaded clip (MP3, WAV, FLAC, OGG, AAC) into a mono
//! f32 waveform, optionally resampled to a fixed analysis rate.
//!
//! Uses symphonia for format-agnostic decoding and rubato for resampling.

use std::io::Cursor;

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::FromSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use tracing::{debug, warn};

use super::resample::resample_mono;
use super::waveform::Waveform;
use crate::{Error, Result};

/// Decoder collaborator contract
///
/// Implementations turn a container byte blob into a mono waveform.
/// `target_sample_rate = None` keeps the native rate.
pub trait AudioDecoder: Send + Sync {
    fn decode(
        &self,
        bytes: &[u8],
        target_sample_rate: Option<u32>,
        force_mono: bool,
    ) -> Result<Waveform>;
}

/// symphonia-backed decoder
///
/// With `force_mono` all channels are averaged; without it only the first
/// channel is kept, since the waveform type is single-channel.
#[derive(Debug, Clone, Default)]
pub struct SymphoniaDecoder {
    /// Optional container hint (file extension such as "mp3")
    hint_extension: Option<String>,
}

impl SymphoniaDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that passes a file-extension hint to the format probe
    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            hint_extension: Some(extension.into()),
        }
    }
}

impl AudioDecoder for SymphoniaDecoder {
    /// **Algorithm:**
    /// 1. Probe the container from an in-memory cursor
    /// 2. Find the first audio track and create its decoder
    /// 3. Decode all packets, mixing each buffer down to mono
    /// 4. Resample when a target rate is requested
    fn decode(
        &self,
        bytes: &[u8],
        target_sample_rate: Option<u32>,
        force_mono: bool,
    ) -> Result<Waveform> {
        if bytes.is_empty() {
            return Err(Error::Decode("Empty audio payload".to_string()));
        }

        let source = Cursor::new(bytes.to_vec());
        let mss = MediaSourceStream::new(Box::new(source), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = &self.hint_extension {
            hint.with_extension(extension);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| Error::Decode(format!("Failed to probe audio format: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Error::Decode("No audio track found".to_string()))?;

        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| Error::Decode(format!("Unsupported codec: {}", e)))?;

        let mut samples: Vec<f32> = Vec::new();
        let mut channel_count = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    return Err(Error::Decode(format!("Error reading packet: {}", e)));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    // Corrupt frame inside an otherwise valid stream
                    warn!("Skipping undecodable packet: {}", e);
                    continue;
                }
                Err(e) => return Err(Error::Decode(format!("Failed to decode packet: {}", e))),
            };

            let spec = *decoded.spec();
            channel_count = spec.channels.count();
            if sample_rate.is_none() {
                sample_rate = Some(spec.rate);
            }

            append_mono(&decoded, force_mono, &mut samples);
        }

        let native_rate =
            sample_rate.ok_or_else(|| Error::Decode("Sample rate unknown".to_string()))?;

        if samples.is_empty() {
            return Err(Error::Decode("Audio stream contained no samples".to_string()));
        }

        debug!(
            sample_rate = native_rate,
            channels = channel_count,
            total_samples = samples.len(),
            "Audio decoding complete"
        );

        let (samples, rate) = match target_sample_rate {
            Some(target) if target != native_rate => {
                (resample_mono(samples, native_rate, target)?, target)
            }
            _ => (samples, native_rate),
        };

        Ok(Waveform::new(samples, rate))
    }
}

/// Append one decoded buffer to `out` as mono f32
fn append_mono(decoded: &AudioBufferRef, force_mono: bool, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::U8(buf) => mix_down(&**buf, force_mono, out),
        AudioBufferRef::U16(buf) => mix_down(&**buf, force_mono, out),
        AudioBufferRef::U24(buf) => mix_down(&**buf, force_mono, out),
        AudioBufferRef::U32(buf) => mix_down(&**buf, force_mono, out),
        AudioBufferRef::S8(buf) => mix_down(&**buf, force_mono, out),
        AudioBufferRef::S16(buf) => mix_down(&**buf, force_mono, out),
        AudioBufferRef::S24(buf) => mix_down(&**buf, force_mono, out),
        AudioBufferRef::S32(buf) => mix_down(&**buf, force_mono, out),
        AudioBufferRef::F32(buf) => mix_down(&**buf, force_mono, out),
        AudioBufferRef::F64(buf) => mix_down(&**buf, force_mono, out),
    }
}

fn mix_down<S>(buf: &AudioBuffer<S>, force_mono: bool, out: &mut Vec<f32>)
where
    S: Sample,
    f32: FromSample<S>,
{
    let num_channels = buf.spec().channels.count();
    let num_frames = buf.frames();
    if num_channels == 0 {
        return;
    }

    out.reserve(num_frames);

    if !force_mono || num_channels == 1 {
        out.extend(buf.chan(0).iter().map(|&s| f32::from_sample(s)));
        return;
    }

    for frame_idx in 0..num_frames {
        let mut sum = 0.0f32;
        for ch in 0..num_channels {
            sum += f32::from_sample(buf.chan(ch)[frame_idx]);
        }
        out.push(sum / num_channels as f32);
    }
}
