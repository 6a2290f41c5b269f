//! Windowed spectral analysis

use std::fmt;

use num_complex::Complex;
use num_traits::Zero;
use rustfft::FftPlanner;

/// Apply a Hann window
///
/// Returns a copy of `input` multiplied by the symmetric Hann
/// window of the same length. A one-sample input is passed
/// through unchanged.
pub fn hann_window(input: &[f32]) -> Vec<f32> {
    let n = input.len();
    if n < 2 {
        return input.to_vec();
    }

    let denom = (n - 1) as f32;
    input
        .iter()
        .enumerate()
        .map(|(i, x)| {
            let w = 0.5 * (1.0 - f32::cos(2.0 * std::f32::consts::PI * i as f32 / denom));
            x * w
        })
        .collect()
}

/// Zero-padded FFT of Hann-windowed real input
///
/// The analyzer caches FFT plans, so reuse one instance
/// for repeated transforms of the same length.
pub struct SpectralAnalyzer {
    planner: FftPlanner<f32>,
    scratch: Vec<Complex<f32>>,
}

impl SpectralAnalyzer {
    /// New analyzer
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            scratch: Vec::new(),
        }
    }

    /// Complex spectrum of `input`
    ///
    /// `input` is windowed, zero-padded to `padded_len`, and
    /// transformed. If `input` is longer than `padded_len`, the
    /// transform length grows to fit it. The output has one
    /// element per FFT bin. Empty input yields an empty output.
    pub fn spectrum(&mut self, input: &[f32], padded_len: usize) -> Vec<Complex<f32>> {
        if input.is_empty() {
            return Vec::new();
        }

        let len = usize::max(padded_len, input.len());
        self.scratch.clear();
        self.scratch.extend(
            hann_window(input)
                .into_iter()
                .map(|re| Complex::new(re, 0.0f32)),
        );
        self.scratch.resize(len, Complex::zero());

        let fft = self.planner.plan_fft_forward(len);
        fft.process(&mut self.scratch);
        self.scratch.clone()
    }

    /// Magnitudes of the first `len / 2` bins of `input`'s spectrum
    ///
    /// These are the non-negative frequency bins of a real
    /// input.
    pub fn magnitudes(&mut self, input: &[f32], padded_len: usize) -> Vec<f32> {
        let spec = self.spectrum(input, padded_len);
        let half = spec.len() / 2;
        spec[0..half].iter().map(|c| c.norm()).collect()
    }
}

impl Default for SpectralAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SpectralAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralAnalyzer").finish_non_exhaustive()
    }
}

/// Index of the FFT bin nearest `freq`
///
/// Clamped to the non-negative half of the spectrum, so the
/// result is always a valid index when `fft_len > 0`.
pub fn bin_index(freq: f32, input_rate: u32, fft_len: usize) -> usize {
    if fft_len == 0 || input_rate == 0 {
        return 0;
    }
    let max_bin = (fft_len / 2).saturating_sub(1);
    let bin = (freq / input_rate as f32 * fft_len as f32).round();
    if bin.is_nan() || bin <= 0.0 {
        0
    } else {
        usize::min(bin as usize, max_bin)
    }
}

/// Center frequency of FFT bin `bin` (Hz)
#[inline]
pub fn bin_frequency(bin: usize, input_rate: u32, fft_len: usize) -> f32 {
    bin as f32 * input_rate as f32 / fft_len as f32
}
