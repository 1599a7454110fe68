//! Framing and short-time Fourier transform
//!
//! Frames are taken without centre padding: frame `t` covers samples
//! `[t * hop, t * hop + frame_length)`, so every frame lies entirely inside
//! the signal and a stationary input yields identical frames.

use std::f64::consts::PI;

use super::fft::FftPlan;
use crate::{Error, Result};

/// Smallest squared-window sum the inverse STFT divides by
pub const WINDOW_SUM_FLOOR: f64 = 1e-3;

/// Number of complete frames of `frame_length` samples at `hop` spacing
pub fn frame_count(len: usize, frame_length: usize, hop: usize) -> usize {
    if frame_length == 0 || hop == 0 || len < frame_length {
        return 0;
    }
    1 + (len - frame_length) / hop
}

/// Iterate over complete frames
pub fn frames<'a>(
    samples: &'a [f32],
    frame_length: usize,
    hop: usize,
) -> impl Iterator<Item = &'a [f32]> + 'a {
    (0..frame_count(samples.len(), frame_length, hop))
        .map(move |t| &samples[t * hop..t * hop + frame_length])
}

/// Periodic Hann window of length `n`
pub fn hann_window(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos())
        .collect()
}

/// One STFT column: bins `0..=n_fft/2`
#[derive(Debug, Clone)]
pub struct SpectrumFrame {
    pub re: Vec<f64>,
    pub im: Vec<f64>,
}

impl SpectrumFrame {
    pub fn magnitudes(&self) -> Vec<f64> {
        self.re
            .iter()
            .zip(&self.im)
            .map(|(r, i)| (r * r + i * i).sqrt())
            .collect()
    }
}

/// Complex STFT of a mono signal
#[derive(Debug, Clone)]
pub struct Spectrogram {
    pub n_fft: usize,
    pub hop_length: usize,
    pub sample_rate: u32,
    /// Length of the analysed signal in samples
    pub signal_length: usize,
    pub frames: Vec<SpectrumFrame>,
}

impl Spectrogram {
    /// Compute the STFT with a periodic Hann window
    ///
    /// # Errors
    /// * `n_fft` not a power of two or zero hop
    /// * Signal shorter than one frame
    pub fn compute(
        samples: &[f32],
        sample_rate: u32,
        n_fft: usize,
        hop_length: usize,
    ) -> Result<Self> {
        if !n_fft.is_power_of_two() || hop_length == 0 {
            return Err(Error::Config(format!(
                "Invalid STFT geometry: n_fft={} hop={}",
                n_fft, hop_length
            )));
        }
        if samples.len() < n_fft {
            return Err(Error::FeatureExtraction(format!(
                "Signal too short: {} samples, need at least {}",
                samples.len(),
                n_fft
            )));
        }

        let plan = FftPlan::new(n_fft)?;
        let window = hann_window(n_fft);
        let bins = n_fft / 2 + 1;
        let mut out = Vec::with_capacity(frame_count(samples.len(), n_fft, hop_length));
        let mut real = vec![0.0; n_fft];
        let mut imag = vec![0.0; n_fft];

        for frame in frames(samples, n_fft, hop_length) {
            for (i, (&s, &w)) in frame.iter().zip(&window).enumerate() {
                real[i] = s as f64 * w;
                imag[i] = 0.0;
            }
            plan.forward(&mut real, &mut imag);
            out.push(SpectrumFrame {
                re: real[..bins].to_vec(),
                im: imag[..bins].to_vec(),
            });
        }

        Ok(Self {
            n_fft,
            hop_length,
            sample_rate,
            signal_length: samples.len(),
            frames: out,
        })
    }

    pub fn num_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Centre frequency of every bin in Hz
    pub fn bin_frequencies(&self) -> Vec<f64> {
        let step = self.sample_rate as f64 / self.n_fft as f64;
        (0..self.num_bins()).map(|k| k as f64 * step).collect()
    }

    /// Magnitude spectrogram, `[frame][bin]`
    pub fn magnitudes(&self) -> Vec<Vec<f64>> {
        self.frames.iter().map(SpectrumFrame::magnitudes).collect()
    }

    /// Inverse STFT by weighted overlap-add
    ///
    /// Output has `signal_length` samples. Positions whose squared-window
    /// sum is below [`WINDOW_SUM_FLOOR`] (the outer edges of the first and
    /// last frame, any tail not covered by a frame) are left at 0.
    ///
    /// # Errors
    /// `n_fft` not a power of two.
    pub fn inverse(&self) -> Result<Vec<f64>> {
        let n_fft = self.n_fft;
        let bins = self.num_bins();
        let plan = FftPlan::new(n_fft)?;
        let window = hann_window(n_fft);
        let mut output = vec![0.0; self.signal_length];
        let mut window_sum = vec![0.0; self.signal_length];
        let mut real = vec![0.0; n_fft];
        let mut imag = vec![0.0; n_fft];

        for (t, frame) in self.frames.iter().enumerate() {
            real[..bins].copy_from_slice(&frame.re);
            imag[..bins].copy_from_slice(&frame.im);
            // Hermitian symmetry for a real-valued result
            for k in bins..n_fft {
                real[k] = frame.re[n_fft - k];
                imag[k] = -frame.im[n_fft - k];
            }
            plan.inverse(&mut real, &mut imag);

            let start = t * self.hop_length;
            for i in 0..n_fft {
                let pos = start + i;
                if pos >= output.len() {
                    break;
                }
                output[pos] += real[i] * window[i];
                window_sum[pos] += window[i] * window[i];
            }
        }

        for (sample, &sum) in output.iter_mut().zip(&window_sum) {
            if sum > WINDOW_SUM_FLOOR {
                *sample /= sum;
            } else {
                *sample = 0.0;
            }
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, sr: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / sr as f64).sin() as f32)
            .collect()
    }

    #[test]
    fn test_frame_count() {
        assert_eq!(frame_count(2048, 2048, 512), 1);
        assert_eq!(frame_count(2047, 2048, 512), 0);
        assert_eq!(frame_count(4096, 2048, 512), 5);
        assert_eq!(frames(&[0.0; 4096], 2048, 512).count(), 5);
    }

    #[test]
    fn test_hann_window_endpoints() {
        let w = hann_window(8);
        assert!(w[0].abs() < 1e-12);
        assert!((w[4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_short_signal_is_extraction_error() {
        let err = Spectrogram::compute(&[0.0; 100], 22050, 2048, 512).unwrap_err();
        assert!(matches!(err, Error::FeatureExtraction(_)));
    }

    #[test]
    fn test_peak_bin_matches_frequency() {
        let sr = 22050;
        let spec = Spectrogram::compute(&sine(1000.0, sr, 8192), sr, 2048, 512).unwrap();
        let freqs = spec.bin_frequencies();
        for mags in spec.magnitudes() {
            let peak = (0..mags.len())
                .max_by(|&a, &b| mags[a].total_cmp(&mags[b]))
                .unwrap();
            assert!((freqs[peak] - 1000.0).abs() < 11.0);
        }
    }

    #[test]
    fn test_inverse_reconstructs_interior() {
        let sr = 16000;
        let signal = sine(440.0, sr, 6000);
        let spec = Spectrogram::compute(&signal, sr, 512, 128).unwrap();
        let rebuilt = spec.inverse().unwrap();

        assert_eq!(rebuilt.len(), signal.len());
        for i in 512..5000 {
            assert!(
                (rebuilt[i] - signal[i] as f64).abs() < 1e-6,
                "sample {} differs: {} vs {}",
                i,
                rebuilt[i],
                signal[i]
            );
        }
    }

    #[test]
    fn test_inverse_edges_never_amplified() {
        // One frame: the window tapers to zero at both ends
        let sr = 22050;
        let signal = sine(1000.0, sr, 2048);
        let spec = Spectrogram::compute(&signal, sr, 2048, 512).unwrap();
        let rebuilt = spec.inverse().unwrap();

        assert_eq!(rebuilt[0], 0.0);
        for (i, (&r, &s)) in rebuilt.iter().zip(&signal).enumerate() {
            assert!(
                r.abs() <= s.abs() as f64 + 1e-6,
                "sample {} grew: {} vs {}",
                i,
                r,
                s
            );
        }
    }
}
