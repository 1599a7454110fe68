//! Radix-2 FFT with precomputed tables
//!
//! An STFT runs thousands of transforms of one size, so the bit-reversal
//! permutation and the twiddle factors are built once per size in an
//! [`FftPlan`] and reused for every frame.

use std::f64::consts::PI;

use crate::{Error, Result};

/// Tables for transforms of one power-of-two length
#[derive(Debug, Clone)]
pub struct FftPlan {
    len: usize,
    /// `bit_reversed[i]` is `i` with its `log2(len)` low bits reversed
    bit_reversed: Vec<usize>,
    /// `exp(-2πik/len)` for `k < len/2`, split into parts
    twiddle_re: Vec<f64>,
    twiddle_im: Vec<f64>,
}

impl FftPlan {
    pub fn new(len: usize) -> Result<Self> {
        if len == 0 || !len.is_power_of_two() {
            return Err(Error::Config(format!(
                "FFT length must be a power of two, got {}",
                len
            )));
        }

        let bits = len.trailing_zeros();
        let bit_reversed = (0..len)
            .map(|i| {
                if bits == 0 {
                    0
                } else {
                    i.reverse_bits() >> (usize::BITS - bits)
                }
            })
            .collect();

        let (twiddle_re, twiddle_im) = (0..len / 2)
            .map(|k| {
                let (sin, cos) = (-2.0 * PI * k as f64 / len as f64).sin_cos();
                (cos, sin)
            })
            .unzip();

        Ok(Self {
            len,
            bit_reversed,
            twiddle_re,
            twiddle_im,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Forward transform in place; both slices must have `len()` elements
    pub fn forward(&self, re: &mut [f64], im: &mut [f64]) {
        debug_assert_eq!(re.len(), self.len);
        debug_assert_eq!(im.len(), self.len);
        self.butterflies(re, im);
    }

    /// Inverse transform in place, scaled by `1/len`
    pub fn inverse(&self, re: &mut [f64], im: &mut [f64]) {
        // conj(FFT(conj(x))) / n
        im.iter_mut().for_each(|v| *v = -*v);
        self.butterflies(re, im);
        let scale = 1.0 / self.len as f64;
        re.iter_mut().for_each(|v| *v *= scale);
        im.iter_mut().for_each(|v| *v *= -scale);
    }

    fn butterflies(&self, re: &mut [f64], im: &mut [f64]) {
        let n = self.len;
        for (i, &j) in self.bit_reversed.iter().enumerate() {
            if i < j {
                re.swap(i, j);
                im.swap(i, j);
            }
        }

        let mut span = 1;
        while span < n {
            // Twiddle index stride for blocks of 2 * span
            let stride = n / (2 * span);
            for block in (0..n).step_by(2 * span) {
                for k in 0..span {
                    let w_re = self.twiddle_re[k * stride];
                    let w_im = self.twiddle_im[k * stride];
                    let top = block + k;
                    let bottom = top + span;

                    let x_re = w_re * re[bottom] - w_im * im[bottom];
                    let x_im = w_re * im[bottom] + w_im * re[bottom];

                    re[bottom] = re[top] - x_re;
                    im[bottom] = im[top] - x_im;
                    re[top] += x_re;
                    im[top] += x_im;
                }
            }
            span *= 2;
        }
    }
}
