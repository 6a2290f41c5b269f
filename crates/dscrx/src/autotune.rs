//! Automatic tone frequency estimation
//!
//! Transmitters and receivers are rarely tuned exactly. The
//! [`FrequencyAutoTuner`] watches the spectrum of the incoming
//! audio and moves the mark/space estimate when it finds a
//! convincing pair of peaks with the expected FSK shift.

#[cfg(not(test))]
use log::debug;

#[cfg(test)]
use std::println as debug;

use arraydeque::{ArrayDeque, Saturating};

use crate::spectrum::{bin_frequency, SpectralAnalyzer};
use crate::tone::ToneFrequencyPair;
use crate::waveform::DEFAULT_FFT_SIZE;

/// Number of chunks in the analysis window
const WINDOW_CHUNKS: usize = 2;

/// Power at one frequency
///
/// Emitted for observability; see
/// [`DscEvent::Spectrum`](crate::DscEvent::Spectrum).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrequencyPower {
    /// Bin center frequency (Hz)
    pub frequency: f32,

    /// Spectral magnitude
    pub power: f32,
}

/// Output of one tuner step
#[derive(Clone, Debug, PartialEq, Default)]
pub struct TunerOutput {
    /// Audio chunk released for demodulation
    ///
    /// The tuner delays its input by one chunk. This is `None`
    /// until the analysis window fills.
    pub delayed: Option<Vec<f32>>,

    /// In-band spectrum of the analysis window
    pub spectrum: Vec<FrequencyPower>,
}

/// Tracks the mark and space frequencies
///
/// The tuner keeps a window of the two most recent chunks. On
/// every input, it computes the in-band spectrum of the window
/// and finds its two strongest bins. The tone estimate is moved
/// to those bins only if
///
/// 1. their separation is within `tolerance` of the nominal
///    `shift`; AND
/// 2. their powers differ by more than `dominance` times the
///    larger power.
///
/// The lower of the two becomes the mark tone.
#[derive(Debug)]
pub struct FrequencyAutoTuner {
    analyzer: SpectralAnalyzer,
    window: ArrayDeque<Vec<f32>, WINDOW_CHUNKS, Saturating>,
    tones: ToneFrequencyPair,
    input_rate: u32,
    fft_len: usize,
    band: (f32, f32),
    shift: f32,
    tolerance: f32,
    dominance: f32,
    enabled: bool,
}

impl FrequencyAutoTuner {
    /// New tuner
    ///
    /// Tuning starts from `initial`. Peaks are searched for
    /// within `band`, `(low, high)` in Hz.
    pub fn new(
        input_rate: u32,
        initial: ToneFrequencyPair,
        band: (f32, f32),
        shift: f32,
        tolerance: f32,
    ) -> Self {
        Self {
            analyzer: SpectralAnalyzer::new(),
            window: ArrayDeque::new(),
            tones: initial,
            input_rate,
            fft_len: DEFAULT_FFT_SIZE,
            band: (f32::min(band.0, band.1), f32::max(band.0, band.1)),
            shift,
            tolerance: tolerance.abs(),
            dominance: 0.1,
            enabled: true,
        }
    }

    /// Required power difference between the peaks (fraction)
    pub fn with_dominance(mut self, dominance: f32) -> Self {
        self.dominance = f32::clamp(dominance, 0.0, 1.0);
        self
    }

    /// FFT length for spectral analysis
    ///
    /// The window is zero-padded to this length when shorter.
    pub fn with_fft_len(mut self, fft_len: usize) -> Self {
        self.fft_len = usize::max(fft_len, 2);
        self
    }

    /// Enable or disable retuning
    ///
    /// A disabled tuner still delays the audio and reports the
    /// spectrum, but never moves the tone estimate.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Current tone estimate
    pub fn tones(&self) -> ToneFrequencyPair {
        self.tones
    }

    /// Process one chunk of audio
    pub fn input(&mut self, chunk: &[f32]) -> TunerOutput {
        if self.window.is_full() {
            self.window.pop_front();
        }
        // cannot fail: a slot was freed above
        let _ = self.window.push_back(chunk.to_vec());

        let joined: Vec<f32> = self.window.iter().flatten().copied().collect();
        let spectrum = self.band_spectrum(&joined);
        if self.enabled {
            self.retune(&spectrum);
        }

        let delayed = if self.window.is_full() {
            self.window.pop_front()
        } else {
            None
        };

        TunerOutput { delayed, spectrum }
    }

    /// Forget buffered audio; keep the tone estimate
    pub fn reset(&mut self) {
        self.window.clear();
    }

    // in-band magnitudes of the windowed input
    fn band_spectrum(&mut self, input: &[f32]) -> Vec<FrequencyPower> {
        let mags = self.analyzer.magnitudes(input, self.fft_len);
        let len = usize::max(self.fft_len, input.len());
        mags.into_iter()
            .enumerate()
            .filter_map(|(bin, power)| {
                let frequency = bin_frequency(bin, self.input_rate, len);
                if frequency >= self.band.0 && frequency <= self.band.1 {
                    Some(FrequencyPower { frequency, power })
                } else {
                    None
                }
            })
            .collect()
    }

    fn retune(&mut self, spectrum: &[FrequencyPower]) {
        let mut peaks = spectrum.to_vec();
        peaks.sort_by(|a, b| b.power.total_cmp(&a.power));
        if peaks.len() < 2 {
            return;
        }

        let (first, second) = (peaks[0], peaks[1]);
        let separation = (first.frequency - second.frequency).abs();
        if (separation - self.shift).abs() > self.tolerance {
            return;
        }

        let max = f32::max(first.power, second.power);
        if (first.power - second.power).abs() <= self.dominance * max {
            return;
        }

        let tones = ToneFrequencyPair::from_tones(first.frequency, second.frequency);
        if tones != self.tones {
            debug!(
                "autotune: mark {:.1} Hz, space {:.1} Hz",
                tones.mark, tones.space
            );
            self.tones = tones;
        }
    }
}
