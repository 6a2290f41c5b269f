//! FSK tone power comparison

use crate::spectrum::{bin_index, SpectralAnalyzer};
use crate::waveform::{DEFAULT_FFT_SIZE, DEFAULT_MARK_HZ, DEFAULT_SPACE_HZ};

/// Mark and space tone frequencies (Hz)
///
/// The mark tone signals a binary `1` and is the lower of the
/// two frequencies.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct ToneFrequencyPair {
    /// Mark (binary 1) frequency
    pub mark: f32,

    /// Space (binary 0) frequency
    pub space: f32,
}

impl ToneFrequencyPair {
    /// Tone pair from two frequencies
    ///
    /// The lower frequency becomes the mark tone.
    pub fn from_tones(a: f32, b: f32) -> Self {
        Self {
            mark: f32::min(a, b),
            space: f32::max(a, b),
        }
    }

    /// Separation between the tones (Hz)
    pub fn shift(&self) -> f32 {
        (self.space - self.mark).abs()
    }
}

impl Default for ToneFrequencyPair {
    fn default() -> Self {
        Self {
            mark: DEFAULT_MARK_HZ,
            space: DEFAULT_SPACE_HZ,
        }
    }
}

/// A hard bit decision with soft confidence
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BitDecision {
    /// Decided bit, `0` or `1`
    pub bit: u8,

    /// Confidence in `[0.0, 1.0]`
    ///
    /// The difference between the mark and space powers,
    /// normalized by the larger of the two.
    pub confidence: f32,
}

/// Decides bits by comparing mark and space power
///
/// Each bit-length chunk of audio is windowed and transformed.
/// The spectral magnitude nearest each tone is compared, and
/// the stronger tone wins. Ties go to the mark tone.
#[derive(Debug)]
pub struct ToneBitDetector {
    analyzer: SpectralAnalyzer,
    input_rate: u32,
    fft_len: usize,
}

impl ToneBitDetector {
    /// Create detector for the given sampling rate
    pub fn new(input_rate: u32) -> Self {
        Self::with_fft_len(input_rate, DEFAULT_FFT_SIZE)
    }

    /// Create detector with a custom FFT length
    pub fn with_fft_len(input_rate: u32, fft_len: usize) -> Self {
        Self {
            analyzer: SpectralAnalyzer::new(),
            input_rate,
            fft_len: usize::max(fft_len, 2),
        }
    }

    /// Decide one bit from a chunk of audio
    ///
    /// An empty chunk yields a `1` with zero confidence.
    pub fn detect(&mut self, chunk: &[f32], tones: ToneFrequencyPair) -> BitDecision {
        let spec = self.analyzer.spectrum(chunk, self.fft_len);
        let len = spec.len();

        let power_at = |freq: f32| -> f32 {
            if len == 0 {
                return 0.0;
            }
            spec[bin_index(freq, self.input_rate, len)].norm()
        };

        let mark = power_at(tones.mark);
        let space = power_at(tones.space);
        let max = f32::max(mark, space);

        BitDecision {
            bit: if mark >= space { 1 } else { 0 },
            confidence: if max > 0.0 {
                (mark - space).abs() / max
            } else {
                0.0
            },
        }
    }

    /// Input sampling rate (Hz)
    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }
}
